//! Upload handlers for portfolio, event, and slideshow photos.
//!
//! Single-file endpoints reject the whole request on any failure. Batch
//! endpoints report a per-file result list instead; one bad file never
//! sinks its siblings.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use fotogate_core::models::{
    AssetType, BatchItemResult, BatchUploadResponse, PhotoResponse, SizeClass, UploadResponse,
};
use fotogate_core::{AppError, Config};
use fotogate_processing::{sanitize, select_urls};
use fotogate_storage::keys;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// One file pulled out of a multipart request.
struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

/// Reads the first file field from a multipart body. The reference client
/// sends it under `file`, but any field carrying a filename is accepted.
async fn read_single_file(
    mut multipart: Multipart,
    config: &Config,
) -> Result<UploadedFile, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        check_declared_mime(&content_type, &config.allowed_mime_types)?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;

        check_size(&filename, data.len(), config.max_file_size_bytes)?;
        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::InvalidInput("No file provided".to_string()).into())
}

/// Reads every file field from a multipart body, enforcing the per-file
/// size limit and the per-request file count limit.
async fn read_files(
    mut multipart: Multipart,
    config: &Config,
) -> Result<Vec<UploadedFile>, HttpAppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        if files.len() >= config.max_files_per_request {
            return Err(AppError::InvalidInput(format!(
                "Too many files: at most {} per request",
                config.max_files_per_request
            ))
            .into());
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        check_declared_mime(&content_type, &config.allowed_mime_types)?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;

        check_size(&filename, data.len(), config.max_file_size_bytes)?;
        files.push(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No files provided".to_string()).into());
    }
    Ok(files)
}

/// Cheap prefilter on the declared part content type, applied before the
/// field body is buffered. The sniffer still has the final word on the
/// actual format; this only turns away clients that do not even claim to
/// send an allowed image type.
fn check_declared_mime(content_type: &str, allowed: &[String]) -> Result<(), HttpAppError> {
    if allowed.iter().any(|m| m == content_type) {
        Ok(())
    } else {
        Err(AppError::ImageValidation(format!("Invalid file type: {}", content_type)).into())
    }
}

fn check_size(filename: &str, size: usize, max_size: usize) -> Result<(), HttpAppError> {
    if size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "{} is {} bytes, limit is {} bytes",
            filename, size, max_size
        ))
        .into());
    }
    Ok(())
}

/// Full processing for one validated upload: store the original, run the
/// thumbnail pipeline, and assemble the photo payload.
#[tracing::instrument(skip(state, file), fields(filename = %file.filename, asset_type = %asset_type))]
async fn handle_upload(
    state: &AppState,
    asset_type: AssetType,
    scope_id: Option<&str>,
    file: UploadedFile,
) -> Result<PhotoResponse, HttpAppError> {
    let detected = state.validator.validate(&file.data, &file.content_type)?;

    let stored_name = keys::unique_filename(&file.filename);

    let original_bytes = if state.config.remove_exif {
        let input = file.data.clone();
        tokio::task::spawn_blocking(move || sanitize::remove_exif(&input))
            .await
            .map_err(|e| AppError::Internal(format!("EXIF strip task failed: {}", e)))?
    } else {
        file.data.to_vec()
    };

    let original_key = keys::original_key(asset_type, scope_id, &stored_name);
    let original_url = state
        .storage
        .put(&original_key, original_bytes, detected.canonical_mime())
        .await?;

    let result = state
        .pipeline
        .process(file.data.clone(), &stored_name, asset_type, scope_id)
        .await;

    let urls = select_urls(&result.thumbnails);
    // Slideshow surfaces want the biggest rendition up front
    let display_size = match asset_type {
        AssetType::Slideshow => SizeClass::Large,
        _ => SizeClass::Medium,
    };

    Ok(PhotoResponse {
        id: Uuid::new_v4(),
        event_id: scope_id.map(str::to_string),
        filename: file.filename,
        original_url,
        thumbnail_url: urls.get(display_size).map(str::to_string),
        thumbnail_small_url: urls.small.clone(),
        thumbnail_medium_url: urls.medium.clone(),
        thumbnail_large_url: urls.large.clone(),
        width: result.original.dimensions.width,
        height: result.original.dimensions.height,
        size: file.data.len() as u64,
    })
}

async fn handle_batch(
    state: &AppState,
    asset_type: AssetType,
    scope_id: Option<&str>,
    files: Vec<UploadedFile>,
) -> BatchUploadResponse {
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        let filename = file.filename.clone();
        match handle_upload(state, asset_type, scope_id, file).await {
            Ok(photo) => results.push(BatchItemResult::ok(filename, photo)),
            Err(HttpAppError(err)) => {
                tracing::warn!(filename = %filename, error = %err, "Batch item failed");
                results.push(BatchItemResult::failed(filename, err.to_string()));
            }
        }
    }

    BatchUploadResponse::from_results(results)
}

/// Upload a single portfolio photo
#[utoipa::path(
    post,
    path = "/upload/portfolio",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo uploaded", body = UploadResponse),
        (status = 400, description = "Invalid or disallowed image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn upload_portfolio(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file = read_single_file(multipart, &state.config).await?;
    let photo = handle_upload(&state, AssetType::Portfolio, None, file).await?;
    Ok(Json(UploadResponse {
        success: true,
        photo,
    }))
}

/// Upload a batch of portfolio photos
#[utoipa::path(
    post,
    path = "/upload/portfolio/batch",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file results", body = BatchUploadResponse),
        (status = 400, description = "No files or too many files", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn upload_portfolio_batch(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchUploadResponse>, HttpAppError> {
    let files = read_files(multipart, &state.config).await?;
    Ok(Json(
        handle_batch(&state, AssetType::Portfolio, None, files).await,
    ))
}

/// Upload a single event photo
#[utoipa::path(
    post,
    path = "/upload/event/{event_id}",
    tag = "upload",
    params(("event_id" = String, Path, description = "Event the photo belongs to")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo uploaded", body = UploadResponse),
        (status = 400, description = "Invalid or disallowed image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn upload_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    validate_event_id(&event_id)?;
    let file = read_single_file(multipart, &state.config).await?;
    let photo = handle_upload(&state, AssetType::Events, Some(&event_id), file).await?;
    Ok(Json(UploadResponse {
        success: true,
        photo,
    }))
}

/// Upload a batch of event photos
#[utoipa::path(
    post,
    path = "/upload/event/{event_id}/batch",
    tag = "upload",
    params(("event_id" = String, Path, description = "Event the photos belong to")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file results", body = BatchUploadResponse),
        (status = 400, description = "No files or too many files", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn upload_event_batch(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<BatchUploadResponse>, HttpAppError> {
    validate_event_id(&event_id)?;
    let files = read_files(multipart, &state.config).await?;
    Ok(Json(
        handle_batch(&state, AssetType::Events, Some(&event_id), files).await,
    ))
}

/// Upload a single slideshow photo
#[utoipa::path(
    post,
    path = "/upload/slideshow",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo uploaded", body = UploadResponse),
        (status = 400, description = "Invalid or disallowed image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn upload_slideshow(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file = read_single_file(multipart, &state.config).await?;
    let photo = handle_upload(&state, AssetType::Slideshow, None, file).await?;
    Ok(Json(UploadResponse {
        success: true,
        photo,
    }))
}

/// Event ids become storage key path segments, so they are restricted to a
/// conservative character set.
fn validate_event_id(event_id: &str) -> Result<(), HttpAppError> {
    let valid = !event_id.is_empty()
        && event_id.len() <= 128
        && event_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput("Invalid event id".to_string()).into())
    }
}
