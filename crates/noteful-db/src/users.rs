//! User (credential) repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noteful_core::{new_v7, Error, NewUser, Result, User, UserRepository};

use crate::map_unique_violation;

/// Message reported when a username is already registered.
pub const USERNAME_TAKEN: &str = "Username already taken";

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        password_hash: r.get("password_hash"),
        fullname: r.get("fullname"),
        created_at: r.get("created_at_utc"),
    }
}

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO app_user (id, username, password_hash, fullname, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, username, password_hash, fullname, created_at_utc",
        )
        .bind(new_v7())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.fullname)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, USERNAME_TAKEN))?;

        Ok(user_from_row(&row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, fullname, created_at_utc
             FROM app_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, fullname, created_at_utc
             FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(user_from_row))
    }
}
