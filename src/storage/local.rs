//! Local directory storage backend
//!
//! Stores every image as a file in one flat directory.

use super::{ImageStore, StorageError, StoredImage};
use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Flat directory image store
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Open a store rooted at `root`, creating the directory (recursively) if absent
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;
        debug!("Storage directory ready: {}", root.display());
        Ok(Self { root })
    }

    /// Directory this store writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `filename` to a path directly inside the root
    ///
    /// Names that could point elsewhere (separators, `.`/`..`, empty) are
    /// refused so nothing outside the directory is ever touched.
    fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let invalid = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }

    async fn write_file(mut file: fs::File, data: &[u8]) -> std::io::Result<()> {
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl ImageStore for LocalDirStore {
    async fn save(&self, filename: &str, data: Bytes) -> Result<StoredImage, StorageError> {
        let path = self.resolve(filename)?;

        // Never truncate an existing image on a name collision
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;

        if let Err(e) = Self::write_file(file, &data).await {
            // Don't leave a truncated image behind
            if let Err(cleanup) = fs::remove_file(&path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        "Failed to remove partial file {}: {}",
                        path.display(),
                        cleanup
                    );
                }
            }
            return Err(StorageError::io(path, e));
        }

        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::io(&path, e))?;

        Ok(StoredImage {
            filename: filename.to_string(),
            path,
            modified: DateTime::<Utc>::from(modified),
        })
    }

    async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))?;

        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.root, e))?
        {
            let path = entry.path();
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping non UTF-8 entry: {}", path.display());
                continue;
            };

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Removed by a concurrent delete
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::io(&path, e)),
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|e| StorageError::io(&path, e))?;

            images.push(StoredImage {
                filename,
                path,
                modified: DateTime::<Utc>::from(modified),
            });
        }

        Ok(images)
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.resolve(filename)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::io(path, e))
    }
}
