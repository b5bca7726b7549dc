//! Folder HTTP handlers.
//!
//! Deleting a folder also detaches it from the caller's notes. The two writes
//! run concurrently and are not atomic.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use tracing::{info, warn};

use noteful_core::validation::parse_name;
use noteful_core::Folder;

use super::{created, parse_path_id, JsonBody};
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::AppState;

/// List the caller's folders sorted by name.
pub async fn list_folders(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<Folder>>, ApiError> {
    Ok(Json(state.db.folders.list(auth.user.id).await?))
}

/// Get one folder.
///
/// # Returns
/// - 200 OK with the folder
/// - 400 Bad Request if the id is malformed
/// - 404 Not Found if it does not exist or belongs to someone else
pub async fn get_folder(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Folder>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .db
        .folders
        .get(id, auth.user.id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Create a folder.
///
/// # Returns
/// - 201 Created with the folder and a `Location` header
/// - 400 Bad Request if `name` is missing
/// - 409 Conflict if the caller already has a folder with that name
pub async fn create_folder(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let name = parse_name(&body)?;

    let folder = state.db.folders.create(&name, auth.user.id).await?;
    info!(
        subsystem = "api",
        component = "folders",
        op = "create",
        user_id = %auth.user.id,
        folder_id = %folder.id,
        "Folder created"
    );
    Ok(created(format!("/api/folders/{}", folder.id), folder))
}

/// Rename a folder.
pub async fn update_folder(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<Folder>, ApiError> {
    let id = parse_path_id(&id)?;
    let Json(body) = body?;
    let name = parse_name(&body)?;

    state
        .db
        .folders
        .rename(id, auth.user.id, &name)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Delete a folder and clear it from every note of the caller.
///
/// # Returns
/// - 204 No Content
/// - 404 Not Found if it does not exist or belongs to someone else
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&id)?;
    let owner = auth.user.id;

    let (deleted, cleared) = tokio::join!(
        state.db.folders.delete(id, owner),
        state.db.notes.clear_folder(id, owner)
    );

    if let (Err(e), _) | (_, Err(e)) = (&deleted, &cleared) {
        warn!(
            subsystem = "api",
            component = "folders",
            op = "delete",
            user_id = %owner,
            folder_id = %id,
            error = %e,
            "Folder delete cascade partially failed"
        );
    }
    let cleared = cleared?;
    if !deleted? {
        return Err(ApiError::NotFound);
    }

    info!(
        subsystem = "api",
        component = "folders",
        op = "delete",
        user_id = %owner,
        folder_id = %id,
        result_count = cleared,
        "Folder deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
