//! Note repository implementation.
//!
//! Tags are stored as an id array on the note row and resolved to
//! `{id, name}` pairs at read time. Ids whose tag no longer exists (or is
//! owned by someone else) are dropped from the resolved list.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noteful_core::{
    new_v7, CreateNoteRequest, Error, Note, NoteFilter, NoteRepository, Result, TagRef,
    UpdateNoteRequest,
};

use crate::escape_like;

/// Column list shared by every note read. Expects the note aliased as `n`.
const NOTE_COLUMNS: &str = r#"
    n.id, n.title, n.content, n.folder_id, n.user_id,
    n.created_at_utc, n.updated_at_utc,
    COALESCE(
        (SELECT json_agg(json_build_object('id', t.id, 'name', t.name) ORDER BY t.name COLLATE "C", t.id)
         FROM tag t
         WHERE t.id = ANY(n.tag_ids) AND t.user_id = n.user_id),
        '[]'::json
    ) AS tags
"#;

fn note_from_row(r: &PgRow) -> Note {
    let tags: Json<Vec<TagRef>> = r.get("tags");
    Note {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        folder_id: r.get("folder_id"),
        tags: tags.0,
        user_id: r.get("user_id"),
        created_at: r.get("created_at_utc"),
        updated_at: r.get("updated_at_utc"),
    }
}

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid, owner: Uuid) -> Result<Option<Note>> {
        let query = format!(
            "SELECT {} FROM note n WHERE n.id = $1 AND n.user_id = $2",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(note_from_row))
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, owner: Uuid, filter: NoteFilter) -> Result<Vec<Note>> {
        let mut query = format!("SELECT {} FROM note n WHERE n.user_id = $1 ", NOTE_COLUMNS);
        let mut next_param = {
            let mut idx = 1;
            move || {
                idx += 1;
                idx
            }
        };

        let search = filter
            .search_term
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(escape_like);
        if search.is_some() {
            let p = next_param();
            query.push_str(&format!(
                "AND (n.title ILIKE '%' || ${p} || '%' ESCAPE '\\' \
                 OR n.content ILIKE '%' || ${p} || '%' ESCAPE '\\') "
            ));
        }
        if filter.folder_id.is_some() {
            query.push_str(&format!("AND n.folder_id = ${} ", next_param()));
        }
        if filter.tag_id.is_some() {
            query.push_str(&format!("AND ${} = ANY(n.tag_ids) ", next_param()));
        }
        query.push_str("ORDER BY n.updated_at_utc DESC, n.id DESC");

        let mut q = sqlx::query(&query).bind(owner);
        if let Some(term) = search {
            q = q.bind(term);
        }
        if let Some(folder_id) = filter.folder_id {
            q = q.bind(folder_id);
        }
        if let Some(tag_id) = filter.tag_id {
            q = q.bind(tag_id);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Note>> {
        self.fetch(id, owner).await
    }

    async fn create(&self, owner: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note (id, user_id, title, content, folder_id, tag_ids, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(id)
        .bind(owner)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.folder_id)
        .bind(&req.tag_ids)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch(id, owner)
            .await?
            .ok_or_else(|| Error::Internal(format!("Note {} vanished after insert", id)))
    }

    async fn update(&self, id: Uuid, owner: Uuid, req: UpdateNoteRequest) -> Result<Option<Note>> {
        let now = Utc::now();
        let result = match &req.content {
            Some(content) => {
                sqlx::query(
                    "UPDATE note SET title = $3, folder_id = $4, tag_ids = $5, content = $6, updated_at_utc = $7
                     WHERE id = $1 AND user_id = $2",
                )
                .bind(id)
                .bind(owner)
                .bind(&req.title)
                .bind(req.folder_id)
                .bind(&req.tag_ids)
                .bind(content)
                .bind(now)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE note SET title = $3, folder_id = $4, tag_ids = $5, updated_at_utc = $6
                     WHERE id = $1 AND user_id = $2",
                )
                .bind(id)
                .bind(owner)
                .bind(&req.title)
                .bind(req.folder_id)
                .bind(&req.tag_ids)
                .bind(now)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id, owner).await
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_folder(&self, folder_id: Uuid, owner: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE note SET folder_id = NULL WHERE user_id = $1 AND folder_id = $2")
                .bind(owner)
                .bind(folder_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn pull_tag(&self, tag_id: Uuid, owner: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE note SET tag_ids = array_remove(tag_ids, $2)
             WHERE user_id = $1 AND $2 = ANY(tag_ids)",
        )
        .bind(owner)
        .bind(tag_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
