use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::HeaderMap,
    response::Json,
};
use futures_util::TryStreamExt;
use multer::Multipart;
use serde_json::{json, Value};

use crate::handlers::auth::require_user;
use crate::models::errors::AppError;
use crate::models::photo::PhotoEntry;
use crate::AppState;

/// Handle multipart photo upload. Expects a single file in a field named
/// `photo`; the stored name is returned so the client can reference it later.
pub async fn upload_photo(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Json<Value>, AppError> {
    let email = require_user(&state, request.headers()).await?;
    let storage_key = state.credentials.storage_key(&email).await?;

    let boundary = request
        .headers()
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| {
            AppError::validation_failed("Missing or invalid multipart boundary")
        })?;

    // Convert the request body to a stream
    let stream = request
        .into_body()
        .into_data_stream()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
    let mut multipart = Multipart::new(stream, boundary);

    let mut stored: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::validation_failed(format!("Failed to parse uploaded file: {}", e))
    })? {
        let name = field
            .name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let filename = field.file_name().map(|s| s.to_string());

        tracing::debug!("Processing field: {} (filename: {:?})", name, filename);

        if name != "photo" {
            continue;
        }

        let original_name = filename
            .ok_or_else(|| AppError::validation_failed("Photo field has no filename"))?;

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::validation_failed(format!("Failed to read file data: {}", e))
        })?;

        if data.len() > state.config.max_file_size {
            return Err(AppError::PayloadTooLarge {
                max_bytes: state.config.max_file_size,
            });
        }
        if data.is_empty() {
            return Err(AppError::validation_failed("Uploaded file is empty"));
        }

        let stored_name = state.storage.store(&storage_key, &original_name, &data).await?;

        tracing::info!(
            "Uploaded photo {} for {} ({} bytes)",
            stored_name,
            email,
            data.len()
        );
        stored = Some(stored_name);
        break;
    }

    let file = stored
        .ok_or_else(|| AppError::validation_failed("Please select a photo to upload"))?;

    Ok(Json(json!({
        "message": "Photo uploaded!",
        "file": file,
    })))
}

/// GET /api/photos — the caller's photos, newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PhotoEntry>>, AppError> {
    let email = require_user(&state, &headers).await?;
    let storage_key = state.credentials.storage_key(&email).await?;

    let photos = state.storage.list(&storage_key).await?;
    Ok(Json(photos))
}

/// DELETE /api/delete/:name
pub async fn delete_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let email = require_user(&state, &headers).await?;
    let storage_key = state.credentials.storage_key(&email).await?;

    state.storage.delete(&storage_key, &name).await?;

    tracing::info!("Deleted photo {} for {}", name, email);
    Ok(Json(json!({ "message": "Photo deleted!" })))
}
