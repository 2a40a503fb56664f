//! HTTP API handlers for atoll-server

pub mod assets;
pub mod export;
pub mod health;
pub mod islands;
pub mod logs;
pub mod trails;
pub mod ws;

pub use assets::asset_routes;
pub use export::export_routes;
pub use health::health_routes;
pub use islands::island_routes;
pub use logs::log_routes;
pub use trails::trail_routes;
pub use ws::ws_routes;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Success envelope for mutations: human-readable message plus the record
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

/// Success envelope for operations with no payload, including degraded
/// deletes (record gone, disk cleanup failed)
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} id: {}", what, raw)))
}

pub(crate) fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", e))
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse a numeric form value. Empty text counts as absent rather than
/// malformed, so half-filled forms behave like forms with the field
/// left out.
pub(crate) fn parse_form_f64(field: &str, raw: &str) -> ApiResult<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", field, raw)))
}
