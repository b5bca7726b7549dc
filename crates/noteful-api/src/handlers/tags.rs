//! Tag HTTP handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use tracing::{info, warn};

use noteful_core::validation::parse_name;
use noteful_core::Tag;

use super::{created, parse_path_id, JsonBody};
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_tags(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.db.tags.list(auth.user.id).await?))
}

pub async fn get_tag(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .db
        .tags
        .get(id, auth.user.id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn create_tag(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let name = parse_name(&body)?;

    let tag = state.db.tags.create(&name, auth.user.id).await?;
    info!(
        subsystem = "api",
        component = "tags",
        op = "create",
        user_id = %auth.user.id,
        tag_id = %tag.id,
        "Tag created"
    );
    Ok(created(format!("/api/tags/{}", tag.id), tag))
}

pub async fn update_tag(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<Tag>, ApiError> {
    let id = parse_path_id(&id)?;
    let Json(body) = body?;
    let name = parse_name(&body)?;

    state
        .db
        .tags
        .rename(id, auth.user.id, &name)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Delete a tag and pull it from every note of the caller, concurrently.
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&id)?;
    let owner = auth.user.id;

    let (deleted, pulled) = tokio::join!(
        state.db.tags.delete(id, owner),
        state.db.notes.pull_tag(id, owner)
    );

    if let (Err(e), _) | (_, Err(e)) = (&deleted, &pulled) {
        warn!(
            subsystem = "api",
            component = "tags",
            op = "delete",
            user_id = %owner,
            tag_id = %id,
            error = %e,
            "Tag delete cascade partially failed"
        );
    }
    let pulled = pulled?;
    if !deleted? {
        return Err(ApiError::NotFound);
    }

    info!(
        subsystem = "api",
        component = "tags",
        op = "delete",
        user_id = %owner,
        tag_id = %id,
        result_count = pulled,
        "Tag deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
