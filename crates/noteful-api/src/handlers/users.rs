//! Account registration.

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::info;

use noteful_core::validation::Registration;
use noteful_core::{Error, NewUser};

use super::{created, JsonBody};
use crate::error::ApiError;
use crate::password::hash_password_async;
use crate::AppState;

/// Register a new account.
///
/// # Returns
/// - 201 Created with `{id, username, fullname}` and a `Location` header
/// - 422 Unprocessable Entity with the failing field as `location`
pub async fn create_user(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let registration = Registration::parse(&body)?;

    let password_hash = hash_password_async(registration.password).await?;
    let user = state
        .db
        .users
        .create(NewUser {
            username: registration.username,
            password_hash,
            fullname: registration.fullname,
        })
        .await
        .map_err(|e| match e {
            Error::Conflict(message) => ApiError::Validation {
                location: "username".to_string(),
                message,
            },
            other => other.into(),
        })?;

    info!(
        subsystem = "api",
        component = "users",
        op = "register",
        user_id = %user.id,
        "User registered"
    );

    Ok(created(format!("/api/users/{}", user.id), user.public()))
}
