//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! Client errors carry a descriptive message; server errors answer with a
//! generic message and log the underlying cause.

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upload request carried no `image` file
    #[error("No image file received")]
    MissingImage,

    /// Upload request carried more than one `image` file
    #[error("Only one image file is allowed")]
    TooManyImages,

    /// Request body exceeded the configured limit
    #[error("Image exceeds the upload size limit")]
    PayloadTooLarge,

    /// No stored image with the given name
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// Writing an upload failed
    #[error("Error saving image: {0}")]
    SaveFailed(#[source] StorageError),

    /// Enumerating stored images failed
    #[error("Error reading images: {0}")]
    ListFailed(#[source] StorageError),

    /// Removing an image failed
    #[error("Error deleting image: {0}")]
    DeleteFailed(#[source] StorageError),
}

/// JSON body of every failed API call
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Human readable reason
    pub message: &'static str,
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingImage | AppError::TooManyImages => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SaveFailed(_) | AppError::ListFailed(_) | AppError::DeleteFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to the client, never including internal detail
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::MissingImage => "No image file received",
            AppError::TooManyImages => "Only one image file is allowed",
            AppError::PayloadTooLarge => "Image exceeds the upload size limit",
            AppError::ImageNotFound(_) => "Image not found",
            AppError::SaveFailed(_) => "Error saving image",
            AppError::ListFailed(_) => "Error reading images",
            AppError::DeleteFailed(_) => "Error deleting image",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "{}", self);
        }

        let body = Json(ErrorBody {
            success: false,
            message: self.public_message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> StorageError {
        StorageError::Io {
            path: "uploads/x.jpg".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::TooManyImages.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::ImageNotFound("x.jpg".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::SaveFailed(io_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ListFailed(io_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::DeleteFailed(io_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::DeleteFailed(io_error());
        assert_eq!(err.public_message(), "Error deleting image");
        // Detail stays in the Display output used for logs
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::ImageNotFound("gone.jpg".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
