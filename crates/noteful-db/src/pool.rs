//! PostgreSQL connection pool.

use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use noteful_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How long a request may wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Sizing of the request-serving pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolConfig {
    /// A pool of at most `max_connections` (at least one).
    pub fn new(max_connections: u32) -> Self {
        Self {
            max_connections: max_connections.max(1),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

pub(crate) async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Connection usage, reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

impl PoolStats {
    /// Every open connection is checked out; new requests will queue.
    pub fn saturated(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

/// Snapshot `pool`, warning when it is saturated.
pub fn pool_stats(pool: &PgPool) -> PoolStats {
    let stats = PoolStats {
        size: pool.size(),
        idle: pool.num_idle(),
    };
    if stats.saturated() {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = stats.size,
            "Connection pool has no idle connections, requests may queue"
        );
    }
    stats
}
