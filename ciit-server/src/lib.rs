//! ciit-server library - Catalog and session HTTP service
//!
//! Serves the interview catalog (topics, barriers, concepts) from YAML files
//! and session records from JSON files, with uploaded concept images served
//! statically. State is flat files on disk; there is no database.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod error;
pub mod sessions;
pub mod watcher;

pub use catalog::CatalogStore;
pub use error::{ApiError, ApiResult};
pub use sessions::SessionStore;

/// Request body cap for the whole router. Set above the per-image limit the
/// catalog store enforces so an oversize upload gets a 400 with a message
/// instead of a bare transport-level 413.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// In-memory catalog backed by the YAML files
    pub catalog: CatalogStore,
    /// Flat-file session store
    pub sessions: SessionStore,
    /// Server start instant, reported by the health endpoint
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: CatalogStore, sessions: SessionStore) -> Self {
        Self {
            catalog,
            sessions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// The kiosk client is served from a different origin during development, so
/// CORS stays permissive. Uploaded images are served directly from disk.
pub fn build_router(state: AppState) -> Router {
    let images_dir = state.catalog.folders().images_dir();

    Router::new()
        .merge(api::catalog_routes())
        .merge(api::session_routes())
        .merge(api::health_routes())
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
