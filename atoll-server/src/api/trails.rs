//! Trail handlers: upload, list, raw file download, delete
//!
//! Trails are sidecar JSON documents (movement paths, annotations)
//! keyed by island name rather than island id, stored whole under
//! `trails/<island>/<category>/` with no archive processing.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{bad_multipart, non_empty, parse_id, MessageResponse, StatusMessage};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::ingest::layout;
use crate::models::Trail;
use crate::pagination::{PageParams, Paged};
use crate::AppState;

#[derive(Debug, Default)]
struct TrailForm {
    island_name: Option<String>,
    category: Option<String>,
    file: Option<(String, Bytes)>,
}

impl TrailForm {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = TrailForm::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "file" {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("file must be a file field".to_string()))?;
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.file = Some((filename, bytes));
                continue;
            }

            let text = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "isle_name" => form.island_name = non_empty(text),
                "category" => form.category = non_empty(text),
                _ => {}
            }
        }

        Ok(form)
    }
}

/// POST /api/v1/trails
///
/// Stores the file as-is and records it. Unlike asset uploads, a failed
/// record insert removes the file again; the trail file has no value
/// without its record.
pub async fn create_trail(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse<Trail>>> {
    let form = TrailForm::from_multipart(multipart).await?;

    let island_name = form
        .island_name
        .ok_or_else(|| ApiError::BadRequest("isle_name is required".to_string()))?;
    let category = form
        .category
        .ok_or_else(|| ApiError::BadRequest("category is required".to_string()))?;
    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let dir = layout::trail_dir(&state.upload_root, &island_name, &category);
    layout::ensure_dir(&dir)?;
    let save_path = dir.join(&filename);
    std::fs::write(&save_path, &bytes)?;

    let trail = Trail {
        trail_id: Uuid::new_v4(),
        island_name,
        name: filename,
        path: save_path.display().to_string(),
        category,
        created_at: Utc::now(),
    };

    if let Err(e) = db::trails::create_trail(&state.db, &trail).await {
        if let Err(remove_err) = std::fs::remove_file(&save_path) {
            warn!(path = %save_path.display(), "failed to remove trail file after insert error: {}", remove_err);
        }
        return Err(e.into());
    }
    info!(trail = %trail.name, island = %trail.island_name, category = %trail.category, "trail stored");

    Ok(Json(MessageResponse {
        message: "Trail uploaded".to_string(),
        data: trail,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TrailListParams {
    pub isle_name: Option<String>,
    pub category: Option<String>,
    pub trail_name: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET /api/v1/trails
///
/// Paginated trails of one island and category, newest first, with an
/// optional name substring filter.
pub async fn list_trails(
    State(state): State<AppState>,
    Query(params): Query<TrailListParams>,
) -> ApiResult<Json<Paged<Trail>>> {
    let island_name = params
        .isle_name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("isle_name is required".to_string()))?;
    let category = params
        .category
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("category is required".to_string()))?;

    let page = PageParams::from_options(params.page, params.page_size);
    let trail_name = params.trail_name.filter(|s| !s.is_empty());

    let (trails, total) =
        db::trails::list_trails(&state.db, &island_name, &category, trail_name.as_deref(), page)
            .await?;

    Ok(Json(Paged::new(trails, total, page)))
}

/// GET /api/v1/trails/:trail_id/file
///
/// Returns the raw trail file.
pub async fn get_trail_file(
    State(state): State<AppState>,
    Path(trail_id): Path<String>,
) -> ApiResult<Response> {
    let trail_id = parse_id(&trail_id, "trail")?;
    let Some(trail) = db::trails::load_trail(&state.db, trail_id).await? else {
        return Err(ApiError::NotFound(format!("Trail not found: {}", trail_id)));
    };

    let bytes = match tokio::fs::read(&trail.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "Trail file missing on disk: {}",
                trail.path
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = if std::path::Path::new(&trail.path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
    {
        "application/json"
    } else {
        "application/octet-stream"
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// DELETE /api/v1/trails/:trail_id
///
/// Record first, then the file; a failed file removal downgrades the
/// message only.
pub async fn delete_trail(
    State(state): State<AppState>,
    Path(trail_id): Path<String>,
) -> ApiResult<Json<StatusMessage>> {
    let trail_id = parse_id(&trail_id, "trail")?;
    let Some(trail) = db::trails::load_trail(&state.db, trail_id).await? else {
        return Err(ApiError::NotFound(format!("Trail not found: {}", trail_id)));
    };

    db::trails::delete_trail(&state.db, trail_id).await?;
    info!(trail = %trail.name, island = %trail.island_name, "trail record deleted");

    let result = match std::fs::remove_file(&trail.path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    };
    if let Err(e) = result {
        warn!(path = %trail.path, "trail file cleanup failed: {}", e);
        return Ok(Json(StatusMessage {
            message: format!("Trail record deleted, but file cleanup failed: {}", e),
        }));
    }

    Ok(Json(StatusMessage {
        message: "Trail deleted".to_string(),
    }))
}

/// Build trail routes
pub fn trail_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/trails", get(list_trails).post(create_trail))
        .route("/api/v1/trails/:trail_id/file", get(get_trail_file))
        .route("/api/v1/trails/:trail_id", delete(delete_trail))
}
