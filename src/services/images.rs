//! Image service
//!
//! Business rules for captured images: server-side naming, which stored
//! entries count as images, and listing order. Storage I/O is delegated to an
//! [`ImageStore`].

use crate::storage::{ImageStore, StorageError, StoredImage};
use axum::body::Bytes;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Prefix of every generated file name
pub const FILENAME_PREFIX: &str = "captured-image-";

/// Extension given to every upload, whatever its declared content type
pub const UPLOAD_EXTENSION: &str = ".jpg";

/// Suffixes of entries reported by listings (case-sensitive)
pub const LISTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Upper bound (inclusive) of the random part of generated names
const MAX_NONCE: u32 = 1_000_000_000;

/// Build a file name from its two distinguishing parts
pub fn format_filename(unix_millis: i64, nonce: u32) -> String {
    format!(
        "{}{}-{}{}",
        FILENAME_PREFIX, unix_millis, nonce, UPLOAD_EXTENSION
    )
}

/// Generate a fresh name from the current time and a random integer
///
/// Two uploads in the same millisecond only collide if they also draw the
/// same random number.
pub fn generate_filename() -> String {
    let nonce = rand::thread_rng().gen_range(0..=MAX_NONCE);
    format_filename(Utc::now().timestamp_millis(), nonce)
}

/// Whether an entry name should appear in listings
pub fn is_listed_image(filename: &str) -> bool {
    LISTED_EXTENSIONS
        .iter()
        .any(|ext| filename.ends_with(ext))
}

/// Sort newest first; equal timestamps fall back to name order
pub fn sort_newest_first(images: &mut [StoredImage]) {
    images.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

/// Image operations on top of a storage backend
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ImageStore>,
}

impl ImageService {
    /// Create a service over `store`
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Store an uploaded image under a newly generated name
    pub async fn upload(&self, data: Bytes) -> Result<StoredImage, StorageError> {
        let filename = generate_filename();
        let size = data.len();
        let stored = self.store.save(&filename, data).await?;
        info!("Image saved: {} ({} bytes)", stored.filename, size);
        Ok(stored)
    }

    /// List stored images, most recently modified first
    ///
    /// Any backend failure fails the whole listing.
    pub async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let mut images: Vec<StoredImage> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|image| is_listed_image(&image.filename))
            .collect();
        sort_newest_first(&mut images);
        Ok(images)
    }

    /// Delete an image by name
    ///
    /// Returns [`StorageError::NotFound`] when there is nothing to delete,
    /// including when a concurrent delete removed it first.
    pub async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        if !self.store.exists(filename).await? {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        self.store.delete(filename).await?;
        info!("Image deleted: {}", filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalDirStore;
    use chrono::{DateTime, TimeZone};
    use std::collections::HashSet;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn stored(filename: &str, modified: DateTime<Utc>) -> StoredImage {
        StoredImage {
            filename: filename.to_string(),
            path: PathBuf::from(filename),
            modified,
        }
    }

    fn parse_generated(name: &str) -> Option<(&str, &str)> {
        let rest = name.strip_prefix(FILENAME_PREFIX)?.strip_suffix(".jpg")?;
        let (millis, nonce) = rest.split_once('-')?;
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        (digits(millis) && digits(nonce)).then_some((millis, nonce))
    }

    #[test]
    fn test_format_filename() {
        assert_eq!(
            format_filename(1_700_000_000_000, 123_456_789),
            "captured-image-1700000000000-123456789.jpg"
        );
    }

    #[test]
    fn test_generate_filename_shape() {
        let before = Utc::now().timestamp_millis();
        let name = generate_filename();
        let after = Utc::now().timestamp_millis();

        let (millis, nonce) = parse_generated(&name).expect("Unexpected filename shape");
        let millis: i64 = millis.parse().unwrap();
        let nonce: u64 = nonce.parse().unwrap();
        assert!(millis >= before && millis <= after);
        assert!(nonce <= MAX_NONCE as u64);
    }

    #[test]
    fn test_generate_filename_distinct() {
        let names: HashSet<String> = (0..100).map(|_| generate_filename()).collect();
        assert_eq!(names.len(), 100);
    }

    #[test]
    fn test_is_listed_image() {
        assert!(is_listed_image("a.jpg"));
        assert!(is_listed_image("a.jpeg"));
        assert!(is_listed_image("a.png"));
        assert!(!is_listed_image("a.JPG"));
        assert!(!is_listed_image("a.gif"));
        assert!(!is_listed_image("a.jpg.txt"));
        assert!(!is_listed_image("jpg"));
    }

    #[test]
    fn test_sort_newest_first_with_name_tiebreak() {
        let t0 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let t1 = Utc.timestamp_millis_opt(1_700_000_001_000).unwrap();
        let mut images = vec![
            stored("b.jpg", t0),
            stored("old.jpg", t0 - chrono::Duration::seconds(5)),
            stored("new.png", t1),
            stored("a.jpg", t0),
        ];

        sort_newest_first(&mut images);

        let names: Vec<&str> = images.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["new.png", "a.jpg", "b.jpg", "old.jpg"]);
    }

    #[tokio::test]
    async fn test_upload_list_delete() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let store = LocalDirStore::open(temp_dir.path()).await.unwrap();
        let service = ImageService::new(Arc::new(store));
        std::fs::write(temp_dir.path().join("readme.txt"), "not an image").unwrap();

        let stored = service
            .upload(Bytes::from_static(b"png bytes"))
            .await
            .expect("Failed to upload");
        assert!(parse_generated(&stored.filename).is_some());
        assert!(temp_dir.path().join(&stored.filename).exists());

        let listed = service.list().await.expect("Failed to list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, stored.filename);

        service.delete(&stored.filename).await.expect("Failed to delete");
        assert!(service.list().await.unwrap().is_empty());
        assert!(temp_dir.path().join("readme.txt").exists());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let store = LocalDirStore::open(temp_dir.path()).await.unwrap();
        let service = ImageService::new(Arc::new(store));

        match service.delete("captured-image-1-2.jpg").await {
            Err(StorageError::NotFound(_)) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }
}
