//! File upload routes (admin only)

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::UploadsResponse;

/// Maximum number of files per upload request
const MAX_FILES: usize = 10;
/// Maximum size of a single file (10 MB)
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted for upload
const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// POST /api/v1/uploads (Admin only)
///
/// Accepts up to 10 files in the `files` multipart field. Files are
/// stored under sanitized unique names and served back at /uploads.
async fn upload_files(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadsResponse>), ApiError> {
    let mut stored = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("files") {
            continue;
        }
        if stored.len() >= MAX_FILES {
            return Err(ApiError::BadRequest(format!(
                "Cannot upload more than {} files",
                MAX_FILES
            )));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();

        if !ALLOWED_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file type: {}",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if data.len() > MAX_FILE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "File {} exceeds the {} MB limit",
                original_name,
                MAX_FILE_SIZE / (1024 * 1024)
            )));
        }

        let file = state.storage.store(&original_name, &content_type, data).await?;
        stored.push(file);
    }

    if stored.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    info!("Stored {} uploaded file(s)", stored.len());

    Ok((StatusCode::CREATED, Json(UploadsResponse { files: stored })))
}

/// Create upload routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/uploads", post(upload_files))
}
