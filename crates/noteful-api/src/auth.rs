//! Bearer token issuing and verification.

use axum::extract::FromRequestParts;
use axum::http::{header, HeaderMap};
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use noteful_core::{Error, PublicUser, Result};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::AppState;

/// Message returned for every rejected bearer token.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// JWT claims. `user` is the caller's identity for every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub user: PublicUser,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Issues and verifies HS256 tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            expiry: Duration::hours(expiry_hours),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            config.jwt_expiry_hours,
        )
    }

    pub fn create_token(&self, user: &PublicUser) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.username.clone(),
            user: user.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to create token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized(e.to_string()))
    }
}

/// Extractor that requires a valid bearer token.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user: PublicUser,
}

/// Token from an `Authorization: Bearer <jwt>` header. The scheme name is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED.to_string()))?;

        let claims = state.tokens.verify_token(token).map_err(|e| {
            tracing::debug!(subsystem = "auth", error = %e, "Bearer token rejected");
            ApiError::Unauthorized(UNAUTHORIZED.to_string())
        })?;

        Ok(RequireAuth { user: claims.user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn alice() -> PublicUser {
        PublicUser {
            id: Uuid::now_v7(),
            username: "alice".to_string(),
            fullname: Some("Alice Example".to_string()),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let service = TokenService::new("secret", "noteful", 1);
        let user = alice();
        let token = service.create_token(&user).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user, user);
        assert_eq!(claims.iss, "noteful");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret", "noteful", 1)
            .create_token(&alice())
            .unwrap();
        let other = TokenService::new("other-secret", "noteful", 1);
        assert!(matches!(
            other.verify_token(&token),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = TokenService::new("secret", "someone-else", 1)
            .create_token(&alice())
            .unwrap();
        let service = TokenService::new("secret", "noteful", 1);
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("secret", "noteful", -2);
        let token = service.create_token(&alice()).unwrap();
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for value in ["Bearer abc", "bearer abc", "BEARER  abc "] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            assert_eq!(bearer_token(&headers), Some("abc"), "{}", value);
        }
        for value in ["Basic abc", "Bearer", "Bearer   ", "Bearerabc"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            assert_eq!(bearer_token(&headers), None, "{}", value);
        }
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
