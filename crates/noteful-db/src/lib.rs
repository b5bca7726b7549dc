//! # noteful-db
//!
//! Storage layer for noteful.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repository implementations for users, folders, tags and notes
//! - An in-memory backend implementing the same repository traits
//! - Schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use noteful_db::{Database, FolderRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/noteful").await?;
//!     db.migrate().await?;
//!
//!     let folder = db.folders.create("Work", owner_id).await?;
//!     println!("Created folder: {}", folder.id);
//!     Ok(())
//! }
//! ```
pub mod folders;
pub mod memory;
pub mod notes;
pub mod pool;
pub mod tags;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::PgPool;

// Re-export core types
pub use noteful_core::*;

pub use folders::PgFolderRepository;
pub use memory::{
    MemoryFolderRepository, MemoryNoteRepository, MemoryStore, MemoryTagRepository,
    MemoryUserRepository,
};
pub use notes::PgNoteRepository;
pub use pool::{pool_stats, PoolConfig, PoolStats};
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// URL scheme selecting the in-memory backend.
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Translate a unique-constraint violation into `Error::Conflict`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(message.to_string())
        }
        _ => Error::Database(err),
    }
}

/// Combined database context with all repositories.
///
/// Cheap to clone; every clone shares the same pool or in-memory store.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool (`None` for the in-memory backend).
    pool: Option<PgPool>,
    /// Credential store.
    pub users: Arc<dyn UserRepository>,
    /// Folder store.
    pub folders: Arc<dyn FolderRepository>,
    /// Tag store.
    pub tags: Arc<dyn TagRepository>,
    /// Note store.
    pub notes: Arc<dyn NoteRepository>,
}

impl Database {
    /// Create a PostgreSQL-backed instance from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            folders: Arc::new(PgFolderRepository::new(pool.clone())),
            tags: Arc::new(PgTagRepository::new(pool.clone())),
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create an instance over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::with_memory_store(MemoryStore::new())
    }

    /// Create an instance over an existing in-memory store.
    pub fn with_memory_store(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new(store.clone())),
            folders: Arc::new(MemoryFolderRepository::new(store.clone())),
            tags: Arc::new(MemoryTagRepository::new(store.clone())),
            notes: Arc::new(MemoryNoteRepository::new(store)),
            pool: None,
        }
    }

    /// Connect to the given URL. `memory://` selects the in-memory backend.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        if url.starts_with(MEMORY_URL_SCHEME) {
            tracing::info!(
                subsystem = "database",
                component = "memory",
                "Using in-memory storage backend"
            );
            return Ok(Self::in_memory());
        }
        let pool = pool::connect_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations. A no-op for the in-memory backend.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::migrate!("../../migrations")
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }

    /// Get the underlying connection pool, if PostgreSQL-backed.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Pool usage, if PostgreSQL-backed.
    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.pool.as_ref().map(pool_stats)
    }

    /// Short name of the active backend, for logs and health output.
    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}
