// Application state
// Shared by all handlers; cheap to clone

use crate::config::Config;
use crate::services::ImageService;
use crate::storage::{ImageStore, LocalDirStore, StorageError};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state
/// Carries the image service and the static asset location
#[derive(Clone)]
pub struct AppState {
    /// Image operations over the configured store
    pub images: ImageService,
    /// Directory holding the static web UI
    pub public_dir: PathBuf,
    /// Directory served under `/uploads`
    pub upload_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create state around an already opened store
    pub fn new(store: Arc<dyn ImageStore>, config: &Config) -> Self {
        Self {
            images: ImageService::new(store),
            public_dir: config.storage.public_dir.clone(),
            upload_dir: config.storage.upload_dir.clone(),
            max_body_bytes: config.upload.max_body_bytes,
        }
    }

    /// Open the local upload directory named by `config` and build state on it
    ///
    /// The directory is created if it does not exist yet.
    pub async fn from_config(config: &Config) -> Result<Self, StorageError> {
        let store = LocalDirStore::open(&config.storage.upload_dir).await?;
        Ok(Self::new(Arc::new(store), config))
    }
}
