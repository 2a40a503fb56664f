//! Stored file handlers: upload, list, height, delete
//!
//! Upload is where the type-dispatching pipeline runs. The handler only
//! reads the form and resolves the island; everything filesystem-shaped
//! happens in [`crate::ingest`].

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Host, Multipart, Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{bad_multipart, non_empty, parse_form_f64, parse_id, MessageResponse, StatusMessage};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::export;
use crate::ingest::{self, layout, UploadError, UploadRequest};
use crate::models::{Category, StoredFile};
use crate::pagination::{PageParams, Paged};
use crate::AppState;

#[derive(Debug, Default)]
struct AssetForm {
    island_id: Option<String>,
    category: Option<String>,
    height: Option<f64>,
    file: Option<(String, Bytes)>,
}

impl AssetForm {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = AssetForm::default();

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
                "isle_id" => form.island_id = non_empty(text),
                "data_type" => form.category = non_empty(text),
                "height" => form.height = parse_form_f64("height", &text)?,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// POST /api/v1/assets
///
/// Multipart upload (`isle_id`, `data_type`, `height`, `file`). Archive
/// categories go through extract-and-locate; the stored path persisted
/// with the record is the payload file, not the container. Artifacts
/// written before a failure stay on disk and are logged.
pub async fn upload_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse<StoredFile>>> {
    let form = AssetForm::from_multipart(multipart).await?;

    let island_id = form
        .island_id
        .ok_or_else(|| ApiError::BadRequest("isle_id is required".to_string()))?;
    let island_id = parse_id(&island_id, "island")?;
    let raw_category = form
        .category
        .ok_or_else(|| ApiError::BadRequest("data_type is required".to_string()))?;
    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let category =
        Category::parse(&raw_category).ok_or_else(|| UploadError::UnsupportedCategory(raw_category))?;

    let Some(island) = db::islands::load_island(&state.db, island_id).await? else {
        return Err(ApiError::NotFound(format!("Island not found: {}", island_id)));
    };

    let request = UploadRequest {
        owner: island.owner.clone(),
        island: island.name.clone(),
        category,
        filename: filename.clone(),
        bytes: bytes.to_vec(),
    };

    let stored_path = match ingest::process(&request, &state.upload_root) {
        Ok(path) => path,
        Err(e) => {
            if !e.leftovers().is_empty() {
                warn!(leftovers = ?e.leftovers(), "upload failed with artifacts left on disk");
            }
            return Err(e.into());
        }
    };

    let now = Utc::now();
    let file = StoredFile {
        file_id: Uuid::new_v4(),
        name: layout::strip_extension(&filename).to_string(),
        category: category.as_str().to_string(),
        path: stored_path.display().to_string(),
        island_id,
        height: form.height.unwrap_or(0.0),
        created_at: now,
        updated_at: now,
    };
    db::assets::create_stored_file(&state.db, &file).await?;
    info!(file = %file.name, category = %file.category, island = %island.name, "asset stored");

    Ok(Json(MessageResponse {
        message: "File uploaded and processed".to_string(),
        data: file,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AssetListParams {
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET /api/v1/assets/island/:island_id
///
/// Paginated files of one island, paths rewritten to public URLs.
pub async fn list_assets(
    State(state): State<AppState>,
    Host(host): Host,
    Path(island_id): Path<String>,
    Query(params): Query<AssetListParams>,
) -> ApiResult<Json<Paged<StoredFile>>> {
    let island_id = parse_id(&island_id, "island")?;
    let page = PageParams::from_options(params.page, params.page_size);

    let (mut files, total) = db::assets::list_stored_files(&state.db, island_id, page).await?;

    for file in &mut files {
        file.path = export::public_url(&host, &file.path);
    }

    Ok(Json(Paged::new(files, total, page)))
}

#[derive(Debug, Deserialize)]
pub struct HeightRequest {
    pub height: f64,
}

/// PUT /api/v1/assets/:asset_id/height
///
/// Blind update: an unknown id changes nothing and still reports
/// success.
pub async fn update_asset_height(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    payload: Result<Json<HeightRequest>, JsonRejection>,
) -> ApiResult<Json<StatusMessage>> {
    let asset_id = parse_id(&asset_id, "asset")?;
    let Json(request) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    db::assets::update_height(&state.db, asset_id, request.height).await?;

    Ok(Json(StatusMessage {
        message: "Height updated".to_string(),
    }))
}

/// DELETE /api/v1/assets/:asset_id
///
/// Removes the record, then the disk artifact: archive-derived records
/// own their extraction directory, plain records just the file. Failed
/// disk cleanup downgrades the message, never the status.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<Json<StatusMessage>> {
    let asset_id = parse_id(&asset_id, "asset")?;
    let Some(file) = db::assets::load_stored_file(&state.db, asset_id).await? else {
        return Err(ApiError::NotFound(format!("File not found: {}", asset_id)));
    };

    db::assets::delete_stored_file(&state.db, asset_id).await?;
    info!(file = %file.name, category = %file.category, "asset record deleted");

    let category = Category::parse(&file.category);
    if let Err(e) = ingest::remove_stored_artifact(category, std::path::Path::new(&file.path)) {
        warn!(path = %file.path, "asset cleanup failed: {}", e);
        return Ok(Json(StatusMessage {
            message: format!("File record deleted, but disk cleanup failed: {}", e),
        }));
    }

    Ok(Json(StatusMessage {
        message: "File deleted".to_string(),
    }))
}

/// Build stored file routes
pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/assets", post(upload_asset))
        .route("/api/v1/assets/island/:island_id", get(list_assets))
        .route("/api/v1/assets/:asset_id/height", put(update_asset_height))
        .route("/api/v1/assets/:asset_id", delete(delete_asset))
}
