//! In-memory storage backend.
//!
//! Implements every repository trait over a single shared state guarded by a
//! mutex. Selected with a `memory://` database URL and used by the HTTP tests.
//! Lock guards are never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use noteful_core::{
    new_v7, CreateNoteRequest, Error, Folder, FolderRepository, NewUser, Note, NoteFilter,
    NoteRepository, Result, Tag, TagRef, TagRepository, UpdateNoteRequest, User, UserRepository,
};

use crate::users::USERNAME_TAKEN;

#[derive(Debug, Clone)]
struct StoredNote {
    id: Uuid,
    title: String,
    content: Option<String>,
    folder_id: Option<Uuid>,
    tag_ids: Vec<Uuid>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    tags: HashMap<Uuid, Tag>,
    notes: HashMap<Uuid, StoredNote>,
}

impl MemoryState {
    fn resolve(&self, note: &StoredNote) -> Note {
        let mut tags: Vec<TagRef> = note
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id))
            .filter(|t| t.user_id == note.user_id)
            .map(TagRef::from)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Note {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            folder_id: note.folder_id,
            tags,
            user_id: note.user_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    fn folder_name_taken(&self, owner: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.folders
            .values()
            .any(|f| f.user_id == owner && f.name == name && Some(f.id) != except)
    }

    fn tag_name_taken(&self, owner: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.tags
            .values()
            .any(|t| t.user_id == owner && t.name == name && Some(t.id) != except)
    }
}

/// Shared in-memory state. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }
}

// =============================================================================
// USERS
// =============================================================================

/// In-memory implementation of UserRepository.
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut state = self.store.lock()?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict(USERNAME_TAKEN.to_string()));
        }
        let created = User {
            id: new_v7(),
            username: user.username,
            password_hash: user.password_hash,
            fullname: user.fullname,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.store.lock()?;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.store.lock()?;
        Ok(state.users.get(&id).cloned())
    }
}

// =============================================================================
// FOLDERS
// =============================================================================

/// In-memory implementation of FolderRepository.
pub struct MemoryFolderRepository {
    store: MemoryStore,
}

impl MemoryFolderRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FolderRepository for MemoryFolderRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Folder>> {
        let state = self.store.lock()?;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.user_id == owner)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Folder>> {
        let state = self.store.lock()?;
        Ok(state
            .folders
            .get(&id)
            .filter(|f| f.user_id == owner)
            .cloned())
    }

    async fn create(&self, name: &str, owner: Uuid) -> Result<Folder> {
        let mut state = self.store.lock()?;
        if state.folder_name_taken(owner, name, None) {
            return Err(Error::Conflict("The folder name already exists".to_string()));
        }
        let now = Utc::now();
        let folder = Folder {
            id: new_v7(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Folder>> {
        let mut state = self.store.lock()?;
        if !state.folders.get(&id).is_some_and(|f| f.user_id == owner) {
            return Ok(None);
        }
        if state.folder_name_taken(owner, name, Some(id)) {
            return Err(Error::Conflict("The folder name already exists".to_string()));
        }
        Ok(state.folders.get_mut(&id).map(|folder| {
            folder.name = name.to_string();
            folder.updated_at = Utc::now();
            folder.clone()
        }))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.store.lock()?;
        if state.folders.get(&id).is_some_and(|f| f.user_id == owner) {
            state.folders.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let state = self.store.lock()?;
        Ok(state.folders.get(&id).is_some_and(|f| f.user_id == owner))
    }
}

// =============================================================================
// TAGS
// =============================================================================

/// In-memory implementation of TagRepository.
pub struct MemoryTagRepository {
    store: MemoryStore,
}

impl MemoryTagRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TagRepository for MemoryTagRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Tag>> {
        let state = self.store.lock()?;
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Tag>> {
        let state = self.store.lock()?;
        Ok(state.tags.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn create(&self, name: &str, owner: Uuid) -> Result<Tag> {
        let mut state = self.store.lock()?;
        if state.tag_name_taken(owner, name, None) {
            return Err(Error::Conflict("The tag name already exists".to_string()));
        }
        let now = Utc::now();
        let tag = Tag {
            id: new_v7(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Tag>> {
        let mut state = self.store.lock()?;
        if !state.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Ok(None);
        }
        if state.tag_name_taken(owner, name, Some(id)) {
            return Err(Error::Conflict("The tag name already exists".to_string()));
        }
        Ok(state.tags.get_mut(&id).map(|tag| {
            tag.name = name.to_string();
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.store.lock()?;
        if state.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            state.tags.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_owned(&self, ids: &[Uuid], owner: Uuid) -> Result<usize> {
        let state = self.store.lock()?;
        let mut seen: Vec<Uuid> = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.contains(id) && state.tags.get(id).is_some_and(|t| t.user_id == owner) {
                seen.push(*id);
            }
        }
        Ok(seen.len())
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// In-memory implementation of NoteRepository.
pub struct MemoryNoteRepository {
    store: MemoryStore,
}

impl MemoryNoteRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn note_matches(note: &StoredNote, filter: &NoteFilter, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let in_title = note.title.to_lowercase().contains(needle);
        let in_content = note
            .content
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(needle));
        if !in_title && !in_content {
            return false;
        }
    }
    if let Some(folder_id) = filter.folder_id {
        if note.folder_id != Some(folder_id) {
            return false;
        }
    }
    if let Some(tag_id) = filter.tag_id {
        if !note.tag_ids.contains(&tag_id) {
            return false;
        }
    }
    true
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn list(&self, owner: Uuid, filter: NoteFilter) -> Result<Vec<Note>> {
        let state = self.store.lock()?;
        let needle = filter
            .search_term
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut hits: Vec<&StoredNote> = state
            .notes
            .values()
            .filter(|n| n.user_id == owner && note_matches(n, &filter, needle.as_deref()))
            .collect();
        hits.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        Ok(hits.into_iter().map(|n| state.resolve(n)).collect())
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Note>> {
        let state = self.store.lock()?;
        Ok(state
            .notes
            .get(&id)
            .filter(|n| n.user_id == owner)
            .map(|n| state.resolve(n)))
    }

    async fn create(&self, owner: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let mut state = self.store.lock()?;
        let now = Utc::now();
        let stored = StoredNote {
            id: new_v7(),
            title: req.title,
            content: req.content,
            folder_id: req.folder_id,
            tag_ids: req.tag_ids,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        let note = state.resolve(&stored);
        state.notes.insert(stored.id, stored);
        Ok(note)
    }

    async fn update(&self, id: Uuid, owner: Uuid, req: UpdateNoteRequest) -> Result<Option<Note>> {
        let mut state = self.store.lock()?;
        let Some(stored) = state.notes.get_mut(&id).filter(|n| n.user_id == owner) else {
            return Ok(None);
        };
        stored.title = req.title;
        stored.folder_id = req.folder_id;
        stored.tag_ids = req.tag_ids;
        if let Some(content) = req.content {
            stored.content = content;
        }
        stored.updated_at = Utc::now();

        let snapshot = stored.clone();
        Ok(Some(state.resolve(&snapshot)))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.store.lock()?;
        if state.notes.get(&id).is_some_and(|n| n.user_id == owner) {
            state.notes.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn clear_folder(&self, folder_id: Uuid, owner: Uuid) -> Result<u64> {
        let mut state = self.store.lock()?;
        let mut touched = 0;
        for note in state
            .notes
            .values_mut()
            .filter(|n| n.user_id == owner && n.folder_id == Some(folder_id))
        {
            note.folder_id = None;
            touched += 1;
        }
        Ok(touched)
    }

    async fn pull_tag(&self, tag_id: Uuid, owner: Uuid) -> Result<u64> {
        let mut state = self.store.lock()?;
        let mut touched = 0;
        for note in state
            .notes
            .values_mut()
            .filter(|n| n.user_id == owner && n.tag_ids.contains(&tag_id))
        {
            note.tag_ids.retain(|id| *id != tag_id);
            touched += 1;
        }
        Ok(touched)
    }
}
