//! HTTP error responder.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Message returned for every 404.
pub const NOT_FOUND: &str = "Not Found";

/// Message returned for every 500; details are only logged.
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Storage, hashing or token minting failure.
    #[error("internal error: {0}")]
    Internal(noteful_core::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Field-level registration failure (422).
    #[error("validation failed at {location}: {message}")]
    Validation { location: String, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<noteful_core::Error> for ApiError {
    fn from(err: noteful_core::Error) -> Self {
        use noteful_core::Error;
        match err {
            Error::NotFound(_) => ApiError::NotFound,
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Validation { location, message } => ApiError::Validation { location, message },
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR }),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation { location, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": message,
                    "reason": "ValidationError",
                    "location": location,
                }),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": NOT_FOUND })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
