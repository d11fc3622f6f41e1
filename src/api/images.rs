//! Image API handlers
//!
//! Upload, listing and deletion of captured images. Handlers translate
//! between HTTP and the [`ImageService`](crate::services::ImageService);
//! every failure leaves here as an [`AppError`].

use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{StorageError, StoredImage};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// Multipart field carrying the uploaded file
pub const IMAGE_FIELD: &str = "image";

/// Public URL prefix under which stored images are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Response for a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`
    pub success: bool,
    /// Confirmation text
    pub message: String,
    /// Generated name of the stored file
    pub filename: String,
    /// Public URL of the stored file
    pub path: String,
}

/// One entry of the image listing
#[derive(Debug, Serialize)]
pub struct ImageEntry {
    /// Name of the stored file
    pub filename: String,
    /// Public URL of the stored file
    pub url: String,
    /// Last modification time, ISO 8601 UTC
    pub timestamp: String,
}

/// Response for listing images
#[derive(Debug, Serialize)]
pub struct ListImagesResponse {
    /// Always `true`
    pub success: bool,
    /// Stored images, newest first
    pub images: Vec<ImageEntry>,
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    /// Always `true`
    pub success: bool,
    /// Confirmation text
    pub message: String,
}

/// Public URL of a stored image
pub fn image_url(filename: &str) -> String {
    format!("{}/{}", UPLOADS_URL_PREFIX, filename)
}

/// ISO 8601 UTC with millisecond precision, e.g. `2023-11-14T22:13:20.000Z`
pub fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<StoredImage> for ImageEntry {
    fn from(image: StoredImage) -> Self {
        Self {
            url: image_url(&image.filename),
            timestamp: iso_timestamp(image.modified),
            filename: image.filename,
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected: {}", e.body_text());
        AppError::PayloadTooLarge
    } else {
        warn!("Failed to read multipart body: {}", e.body_text());
        AppError::MissingImage
    }
}

/// Pull the single `image` file out of a multipart body
///
/// Parts with other names, and `image` parts without a file name, are
/// skipped. Nothing is written until the whole body has been read.
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != IMAGE_FIELD {
            warn!("Ignoring multipart field: {}", field_name);
            continue;
        }
        if field.file_name().is_none() {
            warn!("Ignoring {} field without a file name", IMAGE_FIELD);
            continue;
        }
        if image.is_some() {
            return Err(AppError::TooManyImages);
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        debug!(
            "Received image part: {} bytes, content type {:?}",
            data.len(),
            content_type
        );
        image = Some(data);
    }

    image.ok_or(AppError::MissingImage)
}

/// POST /upload-image - Store one captured image
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Upload without a multipart body: {}", rejection);
        AppError::MissingImage
    })?;

    let data = read_image_field(&mut multipart).await?;
    let stored = state
        .images
        .upload(data)
        .await
        .map_err(AppError::SaveFailed)?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Image captured successfully".to_string(),
        path: image_url(&stored.filename),
        filename: stored.filename,
    }))
}

/// GET /images - List stored images, newest first
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<ListImagesResponse>, AppError> {
    let images = state.images.list().await.map_err(AppError::ListFailed)?;

    Ok(Json(ListImagesResponse {
        success: true,
        images: images.into_iter().map(ImageEntry::from).collect(),
    }))
}

/// DELETE /images/:filename - Permanently remove a stored image
pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteImageResponse>, AppError> {
    match state.images.delete(&filename).await {
        Ok(()) => Ok(Json(DeleteImageResponse {
            success: true,
            message: "Image deleted successfully".to_string(),
        })),
        Err(StorageError::NotFound(_)) => Err(AppError::ImageNotFound(filename)),
        Err(StorageError::InvalidName(name)) => {
            warn!("Refusing to delete {:?}: not a storage entry name", name);
            Err(AppError::ImageNotFound(filename))
        }
        Err(e) => Err(AppError::DeleteFailed(e)),
    }
}
