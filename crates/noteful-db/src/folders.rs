//! Folder repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noteful_core::{new_v7, Error, Folder, FolderRepository, Result};

use crate::map_unique_violation;

const DUPLICATE_NAME: &str = "The folder name already exists";

fn folder_from_row(r: &PgRow) -> Folder {
    Folder {
        id: r.get("id"),
        name: r.get("name"),
        user_id: r.get("user_id"),
        created_at: r.get("created_at_utc"),
        updated_at: r.get("updated_at_utc"),
    }
}

/// PostgreSQL implementation of FolderRepository.
pub struct PgFolderRepository {
    pool: Pool<Postgres>,
}

impl PgFolderRepository {
    /// Create a new PgFolderRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Folder>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, user_id, created_at_utc, updated_at_utc
            FROM folder
            WHERE user_id = $1
            ORDER BY name COLLATE "C", id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(folder_from_row).collect())
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "SELECT id, name, user_id, created_at_utc, updated_at_utc
             FROM folder WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(folder_from_row))
    }

    async fn create(&self, name: &str, owner: Uuid) -> Result<Folder> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO folder (id, user_id, name, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, name, user_id, created_at_utc, updated_at_utc",
        )
        .bind(id)
        .bind(owner)
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NAME))?;

        Ok(folder_from_row(&row))
    }

    async fn rename(&self, id: Uuid, owner: Uuid, name: &str) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "UPDATE folder SET name = $1, updated_at_utc = $2
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

        Ok(row.as_ref().map(folder_from_row))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folder WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM folder WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }
}
