//! Island CRUD handlers
//!
//! Create and update take multipart forms because the island cover
//! image rides along with the scalar fields. Field names are the wire
//! contract the viewer already speaks (`isle_name`, `belong_to`, ...),
//! independent of the internal model names.

use axum::{
    body::Bytes,
    extract::{Host, Multipart, Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{bad_multipart, non_empty, parse_form_f64, parse_id, MessageResponse, StatusMessage};
use crate::db;
use crate::db::islands::IslandFilter;
use crate::error::{ApiError, ApiResult};
use crate::export;
use crate::ingest::layout;
use crate::models::{
    Island, DEFAULT_MOVE_SPEED, DEFAULT_ROTATE_SPEED, DEFAULT_SCALE_SPEED,
};
use crate::pagination::{PageParams, Paged};
use crate::AppState;

/// Island form fields, shared by create (requireds enforced after
/// parsing) and update (everything optional).
#[derive(Debug, Default)]
struct IslandForm {
    name: Option<String>,
    description: Option<String>,
    owner: Option<String>,
    center_x: Option<f64>,
    center_y: Option<f64>,
    camera_x: Option<f64>,
    camera_y: Option<f64>,
    camera_z: Option<f64>,
    archipelago: Option<String>,
    country: Option<String>,
    move_speed: Option<f64>,
    rotate_speed: Option<f64>,
    scale_speed: Option<f64>,
    cover: Option<(String, Bytes)>,
}

impl IslandForm {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = IslandForm::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "isle_pic" {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ApiError::BadRequest("isle_pic must be a file field".to_string())
                    })?;
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.cover = Some((filename, bytes));
                continue;
            }

            let text = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "isle_name" => form.name = non_empty(text),
                "isle_desc" => form.description = non_empty(text),
                "belong_to" => form.owner = non_empty(text),
                "center_x" => form.center_x = parse_form_f64("center_x", &text)?,
                "center_y" => form.center_y = parse_form_f64("center_y", &text)?,
                "camera_x" => form.camera_x = parse_form_f64("camera_x", &text)?,
                "camera_y" => form.camera_y = parse_form_f64("camera_y", &text)?,
                "camera_z" => form.camera_z = parse_form_f64("camera_z", &text)?,
                "archipelago_name" => form.archipelago = non_empty(text),
                "country" => form.country = non_empty(text),
                "moveSpeed" => form.move_speed = parse_form_f64("moveSpeed", &text)?,
                "rotateSpeed" => form.rotate_speed = parse_form_f64("rotateSpeed", &text)?,
                "scaleSpeed" => form.scale_speed = parse_form_f64("scaleSpeed", &text)?,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// POST /api/v1/islands
pub async fn create_island(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse<Island>>> {
    let form = IslandForm::from_multipart(multipart).await?;

    let name = form
        .name
        .ok_or_else(|| ApiError::BadRequest("isle_name is required".to_string()))?;
    let owner = form
        .owner
        .ok_or_else(|| ApiError::BadRequest("belong_to is required".to_string()))?;
    let (filename, bytes) = form
        .cover
        .ok_or_else(|| ApiError::BadRequest("isle_pic file is required".to_string()))?;

    if db::islands::find_island_by_name(&state.db, &name)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(format!(
            "Island name already in use: {}",
            name
        )));
    }

    let dir = layout::island_dir(&state.upload_root, &owner, &name);
    layout::ensure_dir(&dir)?;
    let cover_path = dir.join(&filename);
    std::fs::write(&cover_path, &bytes)?;

    let now = Utc::now();
    let island = Island {
        island_id: Uuid::new_v4(),
        name,
        description: form.description.unwrap_or_default(),
        owner,
        center_x: form.center_x.unwrap_or(0.0),
        center_y: form.center_y.unwrap_or(0.0),
        camera_x: form.camera_x.unwrap_or(0.0),
        camera_y: form.camera_y.unwrap_or(0.0),
        camera_z: form.camera_z.unwrap_or(0.0),
        cover_path: cover_path.display().to_string(),
        archipelago: form.archipelago.unwrap_or_default(),
        country: form.country.unwrap_or_default(),
        move_speed: form.move_speed.unwrap_or(DEFAULT_MOVE_SPEED),
        rotate_speed: form.rotate_speed.unwrap_or(DEFAULT_ROTATE_SPEED),
        scale_speed: form.scale_speed.unwrap_or(DEFAULT_SCALE_SPEED),
        created_at: now,
        updated_at: now,
    };

    db::islands::create_island(&state.db, &island).await?;
    info!(island = %island.name, owner = %island.owner, "island created");

    Ok(Json(MessageResponse {
        message: "Island created".to_string(),
        data: island,
    }))
}

#[derive(Debug, Deserialize)]
pub struct IslandListParams {
    pub belong_to: Option<String>,
    pub isle_name: Option<String>,
    pub archipelago_name: Option<String>,
    pub country: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET /api/v1/islands
///
/// One owner's islands, newest first, with optional name substring and
/// exact archipelago/country filters. Cover paths come back as public
/// URLs so clients can render them directly.
pub async fn list_islands(
    State(state): State<AppState>,
    Host(host): Host,
    Query(params): Query<IslandListParams>,
) -> ApiResult<Json<Paged<Island>>> {
    let owner = params
        .belong_to
        .filter(|o| !o.is_empty())
        .ok_or_else(|| ApiError::BadRequest("belong_to is required".to_string()))?;

    let page = PageParams::from_options(params.page, params.page_size);
    let filter = IslandFilter {
        owner,
        name: params.isle_name.filter(|s| !s.is_empty()),
        archipelago: params.archipelago_name.filter(|s| !s.is_empty()),
        country: params.country.filter(|s| !s.is_empty()),
    };

    let (mut islands, total) = db::islands::list_islands(&state.db, &filter, page).await?;

    for island in &mut islands {
        if !island.cover_path.is_empty() {
            island.cover_path = export::public_url(&host, &island.cover_path);
        }
    }

    Ok(Json(Paged::new(islands, total, page)))
}

/// PUT /api/v1/islands/:island_id
///
/// Partial update: only submitted fields change. The island name and
/// owner are identity fields (stored paths embed them) and stay fixed.
/// A new `isle_pic` replaces the cover file; losing the old file is
/// logged but never fails the update.
pub async fn update_island(
    State(state): State<AppState>,
    Path(island_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse<Island>>> {
    let island_id = parse_id(&island_id, "island")?;
    let Some(mut island) = db::islands::load_island(&state.db, island_id).await? else {
        return Err(ApiError::NotFound(format!("Island not found: {}", island_id)));
    };

    let form = IslandForm::from_multipart(multipart).await?;

    if let Some(description) = form.description {
        island.description = description;
    }
    if let Some(v) = form.center_x {
        island.center_x = v;
    }
    if let Some(v) = form.center_y {
        island.center_y = v;
    }
    if let Some(v) = form.camera_x {
        island.camera_x = v;
    }
    if let Some(v) = form.camera_y {
        island.camera_y = v;
    }
    if let Some(v) = form.camera_z {
        island.camera_z = v;
    }
    if let Some(archipelago) = form.archipelago {
        island.archipelago = archipelago;
    }
    if let Some(country) = form.country {
        island.country = country;
    }
    if let Some(v) = form.move_speed {
        island.move_speed = v;
    }
    if let Some(v) = form.rotate_speed {
        island.rotate_speed = v;
    }
    if let Some(v) = form.scale_speed {
        island.scale_speed = v;
    }

    if let Some((filename, bytes)) = form.cover {
        if !island.cover_path.is_empty() {
            if let Err(e) = std::fs::remove_file(&island.cover_path) {
                warn!(path = %island.cover_path, "failed to remove old cover: {}", e);
            }
        }
        let dir = layout::island_dir(&state.upload_root, &island.owner, &island.name);
        layout::ensure_dir(&dir)?;
        let cover_path = dir.join(&filename);
        std::fs::write(&cover_path, &bytes)?;
        island.cover_path = cover_path.display().to_string();
    }

    island.updated_at = Utc::now();
    db::islands::update_island(&state.db, &island).await?;
    info!(island = %island.name, "island updated");

    Ok(Json(MessageResponse {
        message: "Island updated".to_string(),
        data: island,
    }))
}

/// DELETE /api/v1/islands/:island_id
///
/// Removes the record first, then the whole island directory (the
/// cover's parent). Once the record is gone the delete has succeeded;
/// a failed directory removal only downgrades the message.
pub async fn delete_island(
    State(state): State<AppState>,
    Path(island_id): Path<String>,
) -> ApiResult<Json<StatusMessage>> {
    let island_id = parse_id(&island_id, "island")?;
    let Some(island) = db::islands::load_island(&state.db, island_id).await? else {
        return Err(ApiError::NotFound(format!("Island not found: {}", island_id)));
    };

    db::islands::delete_island(&state.db, island_id).await?;
    info!(island = %island.name, "island record deleted");

    if !island.cover_path.is_empty() {
        if let Some(dir) = std::path::Path::new(&island.cover_path).parent() {
            let result = match std::fs::remove_dir_all(dir) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            };
            if let Err(e) = result {
                warn!(dir = %dir.display(), "island directory cleanup failed: {}", e);
                return Ok(Json(StatusMessage {
                    message: format!("Island record deleted, but file cleanup failed: {}", e),
                }));
            }
        }
    }

    Ok(Json(StatusMessage {
        message: "Island deleted".to_string(),
    }))
}

/// Build island routes
pub fn island_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/islands", get(list_islands).post(create_island))
        .route(
            "/api/v1/islands/:island_id",
            put(update_island).delete(delete_island),
        )
}
