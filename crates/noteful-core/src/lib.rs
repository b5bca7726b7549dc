//! # noteful-core
//!
//! Core types, traits, and abstractions for the noteful backend.
//!
//! This crate provides the domain models (users, folders, tags, notes), the
//! owner-scoped repository traits that storage backends implement, the shared
//! error type, and request input validation.

pub mod error;
pub mod models;
pub mod traits;
pub mod uuid_utils;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::{new_v7, parse_id};
