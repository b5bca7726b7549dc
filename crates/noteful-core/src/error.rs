//! Error types for noteful.

use thiserror::Error;

/// Result type alias using noteful's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for noteful operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, or owned by someone else
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique name or username collision
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input (malformed field, malformed id, dangling reference)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Field-level validation failure reported with the offending field.
    #[error("Validation error at `{location}`: {message}")]
    Validation { location: String, message: String },

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a field-level validation error.
    pub fn validation(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            location: location.into(),
            message: message.into(),
        }
    }
}
