//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noteful_core::{new_v7, Error, Result, Tag, TagRepository};

use crate::map_unique_violation;

const DUPLICATE_NAME: &str = "The tag name already exists";

fn tag_from_row(r: &PgRow) -> Tag {
    Tag {
        id: r.get("id"),
        name: r.get("name"),
        user_id: r.get("user_id"),
        created_at: r.get("created_at_utc"),
        updated_at: r.get("updated_at_utc"),
    }
}

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, user_id, created_at_utc, updated_at_utc
            FROM tag
            WHERE user_id = $1
            ORDER BY name COLLATE "C", id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, name, user_id, created_at_utc, updated_at_utc
             FROM tag WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(tag_from_row))
    }

    async fn create(&self, name: &str, owner: Uuid) -> Result<Tag> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO tag (id, user_id, name, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, name, user_id, created_at_utc, updated_at_utc",
        )
        .bind(new_v7())
        .bind(owner)
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NAME))?;

        Ok(tag_from_row(&row))
    }

    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "UPDATE tag SET name = $1, updated_at_utc = $2
             WHERE id = $3 AND user_id = $4
             RETURNING id, name, user_id, created_at_utc, updated_at_utc",
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NAME))?;

        Ok(row.as_ref().map(tag_from_row))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tag WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_owned(&self, ids: &[Uuid], owner: Uuid) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tag WHERE user_id = $1 AND id = ANY($2)")
                .bind(owner)
                .bind(ids)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(count as usize)
    }
}
