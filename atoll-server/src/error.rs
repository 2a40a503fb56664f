//! Error types for atoll-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::UploadError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload pipeline error; status depends on the failed step
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// atoll-common error
    #[error("Common error: {0}")]
    Common(#[from] atoll_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Upload(ref err) => {
                // A rejected category or a container without its payload is
                // the client's mistake; anything else failed on our side.
                let (status, code) = match err {
                    UploadError::UnsupportedCategory(_) => {
                        (StatusCode::BAD_REQUEST, "UNSUPPORTED_CATEGORY")
                    }
                    UploadError::PayloadNotFound { .. } => {
                        (StatusCode::BAD_REQUEST, "PAYLOAD_NOT_FOUND")
                    }
                    UploadError::DirectoryCreate { .. }
                    | UploadError::Save { .. }
                    | UploadError::Extract { .. }
                    | UploadError::Search { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_FAILED")
                    }
                };
                (status, code, err.to_string())
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
