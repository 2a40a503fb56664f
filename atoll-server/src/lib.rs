//! atoll-server
//!
//! HTTP service for island workspaces: ingests uploaded geodata
//! (extracting archived layers down to their payload), serves the
//! stored files, aggregates per-island scene exports and pushes them
//! to the connected viewer over WebSocket.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod ingest;
pub mod models;
pub mod pagination;

pub use error::{ApiError, ApiResult};

use std::path::PathBuf;

use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};

use atoll_common::push::ViewerLink;

/// Largest accepted request body. Raster archives routinely run to
/// hundreds of megabytes, so the default axum limit is far too small.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub viewer: ViewerLink,
    /// Directory all uploads are stored under; also served at `/uploads`.
    pub upload_root: PathBuf,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, upload_root: PathBuf) -> Self {
        Self {
            db,
            viewer: ViewerLink::new(),
            upload_root,
            startup_time: Utc::now(),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::island_routes())
        .merge(api::export_routes())
        .merge(api::asset_routes())
        .merge(api::trail_routes())
        .merge(api::log_routes())
        .merge(api::ws_routes())
        .merge(api::health_routes())
        .nest_service("/uploads", ServeDir::new(&state.upload_root))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
