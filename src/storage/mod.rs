//! Image storage abstraction
//!
//! The storage directory is the only source of truth: no index is kept in
//! memory and every call goes back to the backend.

pub mod local;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

pub use local::LocalDirStore;

/// One stored image as seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Server-generated file name, unique within the store
    pub filename: String,
    /// Location of the file in the backend
    pub path: PathBuf,
    /// Last modification time reported by the backend
    pub modified: DateTime<Utc>,
}

/// Errors raised by storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// No entry with the given name exists
    #[error("Image not found: {0}")]
    NotFound(String),

    /// The name cannot refer to an entry of this store
    #[error("Invalid image name: {0:?}")]
    InvalidName(String),

    /// Underlying I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Original error
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Backend holding uploaded images
///
/// Implementations only move bytes; naming, filtering and ordering rules
/// live in [`crate::services::images::ImageService`].
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `data` under `filename`
    async fn save(&self, filename: &str, data: Bytes) -> Result<StoredImage, StorageError>;

    /// Enumerate every stored entry, in backend order
    async fn list(&self) -> Result<Vec<StoredImage>, StorageError>;

    /// Remove `filename`, failing with [`StorageError::NotFound`] if absent
    async fn delete(&self, filename: &str) -> Result<(), StorageError>;

    /// Check whether `filename` is present
    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;
}
