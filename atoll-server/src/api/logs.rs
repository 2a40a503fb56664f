//! Workspace activity log handler
//!
//! One entry per island, newest first, with per-category counts of its
//! stored files and trails. The admin page renders this as the
//! workspace overview.

use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub island_name: String,
    pub description: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stored file counts keyed by category tag; empty when the island
    /// has no files.
    pub data_counts: HashMap<String, i64>,
    pub trail_counts: HashMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub data: Vec<LogEntry>,
}

/// GET /api/v1/logs
pub async fn list_logs(State(state): State<AppState>) -> ApiResult<Json<LogsResponse>> {
    let islands = db::islands::list_all_islands(&state.db).await?;
    let file_counts = db::assets::global_counts(&state.db).await?;
    let trail_counts = db::trails::global_counts(&state.db).await?;

    let mut files_by_island: HashMap<Uuid, HashMap<String, i64>> = HashMap::new();
    for count in file_counts {
        files_by_island
            .entry(count.island_id)
            .or_default()
            .insert(count.category, count.total);
    }

    // Trails reference islands by name, not id
    let mut trails_by_island: HashMap<String, HashMap<String, i64>> = HashMap::new();
    for count in trail_counts {
        trails_by_island
            .entry(count.island_name)
            .or_default()
            .insert(count.category, count.total);
    }

    let data = islands
        .into_iter()
        .map(|island| LogEntry {
            data_counts: files_by_island
                .remove(&island.island_id)
                .unwrap_or_default(),
            trail_counts: trails_by_island.remove(&island.name).unwrap_or_default(),
            island_name: island.name,
            description: island.description,
            owner: island.owner,
            created_at: island.created_at,
            updated_at: island.updated_at,
        })
        .collect();

    Ok(Json(LogsResponse { data }))
}

/// Build log routes
pub fn log_routes() -> Router<AppState> {
    Router::new().route("/api/v1/logs", get(list_logs))
}
