//! Login and token refresh.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use noteful_core::validation::parse_credentials;

use super::JsonBody;
use crate::auth::{RequireAuth, UNAUTHORIZED};
use crate::error::ApiError;
use crate::password::verify_password_async;
use crate::AppState;

/// Message for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub auth_token: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
}

/// Exchange username and password for a bearer token.
///
/// Unknown user and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Json<TokenResponse>, ApiError> {
    let Ok(Json(body)) = body else {
        return Err(invalid_credentials());
    };
    let (username, password) = parse_credentials(&body).ok_or_else(invalid_credentials)?;

    let Some(user) = state.db.users.find_by_username(&username).await? else {
        debug!(subsystem = "auth", op = "login", "Unknown username");
        return Err(invalid_credentials());
    };
    if !verify_password_async(password, user.password_hash.clone()).await? {
        debug!(subsystem = "auth", op = "login", user_id = %user.id, "Wrong password");
        return Err(invalid_credentials());
    }

    let auth_token = state.tokens.create_token(&user.public())?;
    info!(subsystem = "auth", op = "login", user_id = %user.id, "Token issued");
    Ok(Json(TokenResponse { auth_token }))
}

/// Issue a fresh token for the caller of a still-valid one.
///
/// The account is re-read so the new token carries its current profile; a
/// token whose account is gone is refused.
pub async fn refresh(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(user) = state.db.users.get(auth.user.id).await? else {
        debug!(subsystem = "auth", op = "refresh", user_id = %auth.user.id, "Account no longer exists");
        return Err(ApiError::Unauthorized(UNAUTHORIZED.to_string()));
    };
    let auth_token = state.tokens.create_token(&user.public())?;
    debug!(subsystem = "auth", op = "refresh", user_id = %user.id, "Token refreshed");
    Ok(Json(TokenResponse { auth_token }))
}
