//! Scene export handler
//!
//! Builds the typed scene document for one island and returns it to the
//! caller. The same document is pushed to the connected viewer, so a
//! browser session refreshes the moment an operator triggers an export.

use axum::{
    extract::{Host, Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use atoll_common::scene::SceneExport;

use crate::api::parse_id;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::export;
use crate::AppState;

/// GET /api/v1/islands/:island_id/export
pub async fn export_island(
    State(state): State<AppState>,
    Host(host): Host,
    Path(island_id): Path<String>,
) -> ApiResult<Json<SceneExport>> {
    let island_id = parse_id(&island_id, "island")?;
    let Some(island) = db::islands::load_island(&state.db, island_id).await? else {
        return Err(ApiError::NotFound(format!(
            "Island not found: {}",
            island_id
        )));
    };

    let files = db::assets::list_all_stored_files(&state.db, island_id).await?;
    let scene = export::aggregate(&island, &files, &host);

    let viewer_subscribed = state.viewer.is_subscribed().await;
    info!(
        island = %island.name,
        files = files.len(),
        viewer = viewer_subscribed,
        "scene exported"
    );
    state.viewer.broadcast(&scene).await;

    Ok(Json(scene))
}

/// Build export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/api/v1/islands/:island_id/export", get(export_island))
}
