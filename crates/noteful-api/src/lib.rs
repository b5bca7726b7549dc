//! noteful-api - HTTP API for noteful
//!
//! The router is built here so integration tests can drive it in-process; the
//! `noteful-api` binary adds logging and a listener around it.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod password;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use noteful_db::Database;

use crate::auth::TokenService;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers::{auth as auth_handlers, folders, notes, tags, users};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenService::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router with middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", post(users::create_user))
        .route("/auth-tokens", post(auth_handlers::login))
        .route("/auth-tokens/refresh", post(auth_handlers::refresh))
        .route(
            "/folders",
            get(folders::list_folders).post(folders::create_folder),
        )
        .route(
            "/folders/:id",
            get(folders::get_folder)
                .put(folders::update_folder)
                .delete(folders::delete_folder),
        )
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/:id",
            get(tags::get_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        )
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        );

    let body_limit = state.config.request_body_limit;
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/openapi.yaml", get(openapi_yaml))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(std::time::Duration::from_secs(3600))
}

// =============================================================================
// HEALTH & DOCS
// =============================================================================

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.db.backend(),
        "pool": state.db.pool_stats(),
    }))
}

/// Serve OpenAPI YAML spec
async fn openapi_yaml() -> impl IntoResponse {
    const SPEC: &str = include_str!("openapi.yaml");
    ([(header::CONTENT_TYPE, "application/yaml")], SPEC)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
