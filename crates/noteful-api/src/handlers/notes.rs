//! Note HTTP handlers.
//!
//! Folder and tag references in a note body must belong to the caller; that is
//! checked here before any write.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use noteful_core::validation::{parse_optional_query_id, reject_nul, NoteInput};
use noteful_core::{parse_id, CreateNoteRequest, Note, NoteFilter, UpdateNoteRequest};

use super::{created, parse_path_id, JsonBody};
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::AppState;

/// Query parameters for listing notes. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

impl ListNotesQuery {
    fn into_filter(self) -> Result<NoteFilter, ApiError> {
        if let Some(term) = &self.search_term {
            reject_nul("searchTerm", term)?;
        }
        Ok(NoteFilter {
            search_term: self.search_term.filter(|s| !s.is_empty()),
            folder_id: parse_optional_query_id(self.folder_id.as_deref(), "folderId")?,
            tag_id: parse_optional_query_id(self.tag_id.as_deref(), "tagId")?,
        })
    }
}

/// Reject folder or tag ids the caller does not own.
async fn check_references(
    state: &AppState,
    owner: Uuid,
    folder_id: Option<Uuid>,
    tag_ids: &[Uuid],
) -> Result<(), ApiError> {
    if let Some(folder_id) = folder_id {
        if !state.db.folders.exists(folder_id, owner).await? {
            return Err(ApiError::BadRequest(
                "The `folderId` does not belong to the user".to_string(),
            ));
        }
    }
    if !tag_ids.is_empty() && state.db.tags.count_owned(tag_ids, owner).await? != tag_ids.len() {
        return Err(ApiError::BadRequest(
            "The `tags` array contains a tag that doesn't belong to the user".to_string(),
        ));
    }
    Ok(())
}

/// List the caller's notes, most recently updated first.
///
/// # Query Parameters
/// - `searchTerm`: case-insensitive substring of title or content
/// - `folderId`: only notes in this folder
/// - `tagId`: only notes carrying this tag
pub async fn list_notes(
    State(state): State<AppState>,
    auth: RequireAuth,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let notes = state.db.notes.list(auth.user.id, filter).await?;
    debug!(
        subsystem = "api",
        component = "notes",
        op = "list",
        user_id = %auth.user.id,
        result_count = notes.len(),
        "Notes listed"
    );
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .db
        .notes
        .get(id, auth.user.id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Create a note.
///
/// # Returns
/// - 201 Created with the note (tags resolved) and a `Location` header
/// - 400 Bad Request for a missing title, malformed ids, or references the
///   caller does not own
pub async fn create_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let input = NoteInput::parse(&body)?;
    let owner = auth.user.id;

    check_references(&state, owner, input.folder_id, &input.tag_ids).await?;

    let note = state
        .db
        .notes
        .create(
            owner,
            CreateNoteRequest {
                title: input.title,
                content: input.content.flatten(),
                folder_id: input.folder_id,
                tag_ids: input.tag_ids,
            },
        )
        .await?;

    info!(
        subsystem = "api",
        component = "notes",
        op = "create",
        user_id = %owner,
        note_id = %note.id,
        "Note created"
    );
    Ok(created(format!("/api/notes/{}", note.id), note))
}

/// Update a note.
///
/// `title`, `folderId` and `tags` are replaced; `content` is only written when
/// present in the body. A body `id` must match the path.
pub async fn update_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(raw_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Note>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    let Json(body) = body?;
    let input = NoteInput::parse(&body)?;
    let owner = auth.user.id;

    if let Some(body_id) = &input.id {
        if parse_id(body_id) != Some(id) {
            return Err(ApiError::BadRequest(format!(
                "Request path id ({}) and request body id ({}) must match",
                raw_id, body_id
            )));
        }
    }

    check_references(&state, owner, input.folder_id, &input.tag_ids).await?;

    let note = state
        .db
        .notes
        .update(
            id,
            owner,
            UpdateNoteRequest {
                title: input.title,
                content: input.content,
                folder_id: input.folder_id,
                tag_ids: input.tag_ids,
            },
        )
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(
        subsystem = "api",
        component = "notes",
        op = "update",
        user_id = %owner,
        note_id = %id,
        "Note updated"
    );
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&id)?;
    if !state.db.notes.delete(id, auth.user.id).await? {
        return Err(ApiError::NotFound);
    }
    info!(
        subsystem = "api",
        component = "notes",
        op = "delete",
        user_id = %auth.user.id,
        note_id = %id,
        "Note deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
