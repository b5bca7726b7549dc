//! Repository traits.
//!
//! Each store is scoped by an owner id that is part of every lookup
//! predicate: a row owned by someone else is indistinguishable from a missing
//! one. Backends (PostgreSQL, in-memory) implement these traits so the HTTP
//! layer can be exercised against either.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Error::Conflict` if the username is taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Look up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Look up a user by id.
    async fn get(&self, id: Uuid) -> Result<Option<User>>;
}

// =============================================================================
// FOLDER REPOSITORY
// =============================================================================

/// Folder store. Names are unique per owner.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// All folders of `owner`, sorted by name ascending.
    async fn list(&self, owner: Uuid) -> Result<Vec<Folder>>;

    /// Fetch one folder owned by `owner`.
    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Folder>>;

    /// Create a folder. Fails with `Error::Conflict` on a duplicate name.
    async fn create(&self, name: &str, owner: Uuid) -> Result<Folder>;

    /// Rename a folder. Returns `None` if it does not exist for `owner`.
    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Folder>>;

    /// Delete a folder. Returns whether a row was removed.
    ///
    /// Notes referencing the folder are not touched here; see
    /// [`NoteRepository::clear_folder`].
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// Whether `id` names a folder owned by `owner`.
    async fn exists(&self, id: Uuid, owner: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Tag store. Names are unique per owner.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags of `owner`, sorted by name ascending.
    async fn list(&self, owner: Uuid) -> Result<Vec<Tag>>;

    /// Fetch one tag owned by `owner`.
    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Tag>>;

    /// Create a tag. Fails with `Error::Conflict` on a duplicate name.
    async fn create(&self, name: &str, owner: Uuid) -> Result<Tag>;

    /// Rename a tag. Returns `None` if it does not exist for `owner`.
    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Tag>>;

    /// Delete a tag. Returns whether a row was removed.
    ///
    /// Notes holding the tag are not touched here; see
    /// [`NoteRepository::pull_tag`].
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// How many of `ids` (deduplicated) name tags owned by `owner`.
    async fn count_owned(&self, ids: &[Uuid], owner: Uuid) -> Result<usize>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Conjunctive filters for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive literal substring matched against title or content.
    pub search_term: Option<String>,
    /// Only notes in this folder.
    pub folder_id: Option<Uuid>,
    /// Only notes carrying this tag.
    pub tag_id: Option<Uuid>,
}

/// Request for creating a note. References are validated by the caller.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

/// Request for updating a note.
///
/// `title`, `folder_id` and `tag_ids` replace the stored values; `content` is
/// only written when `Some` (an inner `None` clears it).
#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: Option<Option<String>>,
    pub folder_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

/// Note store.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Notes of `owner` matching every set filter, most recently updated first.
    async fn list(&self, owner: Uuid, filter: NoteFilter) -> Result<Vec<Note>>;

    /// Fetch one note owned by `owner`.
    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Note>>;

    /// Insert a note and return it with tags resolved.
    async fn create(&self, owner: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Update a note. Returns `None` if it does not exist for `owner`.
    async fn update(&self, id: Uuid, owner: Uuid, req: UpdateNoteRequest) -> Result<Option<Note>>;

    /// Delete a note. Returns whether a row was removed.
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// Unset `folder_id` on every note of `owner` that references it.
    /// Returns the number of notes touched.
    async fn clear_folder(&self, folder_id: Uuid, owner: Uuid) -> Result<u64>;

    /// Remove `tag_id` from the tag set of every note of `owner`.
    /// Returns the number of notes touched.
    async fn pull_tag(&self, tag_id: Uuid, owner: Uuid) -> Result<u64>;
}
