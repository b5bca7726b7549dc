//! HTTP handlers, one module per resource.

pub mod auth;
pub mod folders;
pub mod notes;
pub mod tags;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use noteful_core::parse_id;

use crate::error::ApiError;

/// A JSON body taken as an untyped value so each handler can report field
/// problems precisely. Malformed JSON becomes a 400.
pub type JsonBody = Result<Json<Value>, JsonRejection>;

/// Parse an `:id` path segment. A malformed id is rejected before any lookup.
pub(crate) fn parse_path_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::BadRequest("The `id` is not valid".to_string()))
}

/// 201 with a `Location` header pointing at the new resource.
pub(crate) fn created<T: Serialize>(location: String, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}
