//! Server configuration read from the environment.
//!
//! Environment variables:
//!   DATABASE_URL        - PostgreSQL URL, or `memory://` (default: "postgres://localhost/noteful")
//!   HOST                - bind address (default: "0.0.0.0")
//!   PORT                - bind port (default: 8080)
//!   JWT_SECRET          - HS256 signing secret (development fallback with a warning)
//!   JWT_EXPIRY_HOURS    - token lifetime in hours (default: 168)
//!   JWT_ISSUER          - `iss` claim (default: "noteful")
//!   ALLOWED_ORIGINS     - comma-separated CORS whitelist (default: "http://localhost:3000")
//!   DB_MAX_CONNECTIONS  - pool size (default: 10)
//!   DB_ACQUIRE_TIMEOUT_SECS - wait for a free connection (default: 30)
//!   REQUEST_BODY_LIMIT  - maximum request body in bytes (default: 1 MiB)

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use noteful_db::PoolConfig;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/noteful";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 168;
pub const DEFAULT_JWT_ISSUER: &str = "noteful";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// Signing secret used when `JWT_SECRET` is unset. Never use in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "noteful-development-secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&get, "PORT").unwrap_or(DEFAULT_PORT),
            jwt_secret: get("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEVELOPMENT_JWT_SECRET.to_string()),
            jwt_expiry_hours: parse_var(&get, "JWT_EXPIRY_HOURS").unwrap_or(DEFAULT_JWT_EXPIRY_HOURS),
            jwt_issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            allowed_origins: split_origins(
                &get("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            db_max_connections: parse_var(&get, "DB_MAX_CONNECTIONS").unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            db_acquire_timeout_secs: parse_var(&get, "DB_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
            request_body_limit: parse_var(&get, "REQUEST_BODY_LIMIT").unwrap_or(DEFAULT_REQUEST_BODY_LIMIT),
        }
    }

    /// Whether the development signing secret is in use.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn parse_var<T, F>(get: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    get(key).and_then(|v| v.trim().parse().ok())
}

fn split_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if origins.is_empty() {
        vec![DEFAULT_ALLOWED_ORIGINS.to_string()]
    } else {
        origins
    }
}
