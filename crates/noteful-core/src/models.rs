//! Domain models.
//!
//! Every entity except [`User`] is scoped to an owning user. Serialized forms
//! use camelCase field names and expose the storage id only as `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USERS
// =============================================================================

/// A registered account, including its credential hash.
///
/// Never serialized directly; use [`User::public`] for responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// PHC-format Argon2id hash.
    pub password_hash: String,
    pub fullname: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The caller-visible representation, without the password hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            fullname: self.fullname.clone(),
        }
    }
}

/// Public representation of a user.
///
/// Also embedded in bearer tokens as the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub fullname: Option<String>,
}

/// Data needed to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub fullname: Option<String>,
}

// =============================================================================
// FOLDERS & TAGS
// =============================================================================

/// A named folder owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named label owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag as embedded in a note: `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        TagRef {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// A note with its tags resolved to `{id, name}` pairs.
///
/// `folder_id` stays a bare id and serializes as `null` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<TagRef>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
