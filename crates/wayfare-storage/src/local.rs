//! Local disk storage backend

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{StorageBackend, StoredFile, sanitize_file_name};
use crate::error::StorageError;

/// Local disk storage backend
///
/// Stores uploads flat under `<base_path>`, each under a timestamped
/// unique name, served by the HTTP layer at `<public_prefix>/<name>`.
pub struct LocalStorage {
    base_path: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub async fn new(
        base_path: impl AsRef<Path>,
        public_prefix: &str,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await?;

        info!("Initialized upload storage at {:?}", base_path);

        Ok(Self {
            base_path,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Directory uploads are written to (for the static file service)
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        // Stored names are generated by `store`, but guard direct callers too
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.base_path.join(file_name))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredFile, StorageError> {
        let safe_original = sanitize_file_name(original_name);
        let file_name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &uuid::Uuid::new_v4().simple().to_string()[..8],
            safe_original
        );

        let path = self.file_path(&file_name)?;
        debug!("Storing upload {:?} ({} bytes)", path, data.len());

        let size = data.len() as u64;
        fs::write(&path, &data).await?;

        Ok(StoredFile {
            url: format!("{}/{}", self.public_prefix, file_name),
            file_name,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    async fn exists(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.file_path(file_name)?;
        Ok(path.exists())
    }

    async fn delete(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.file_path(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_storage() -> LocalStorage {
        let dir = std::env::temp_dir()
            .join("wayfare-storage-test")
            .join(uuid::Uuid::new_v4().to_string());
        LocalStorage::new(&dir, "/uploads").await.unwrap()
    }

    #[tokio::test]
    async fn test_store_and_delete() {
        let storage = test_storage().await;

        let stored = storage
            .store("beach photo.jpg", "image/jpeg", Bytes::from_static(b"fake-jpeg"))
            .await
            .unwrap();

        assert!(stored.file_name.ends_with("beach-photo.jpg"));
        assert!(stored.url.starts_with("/uploads/"));
        assert_eq!(stored.size, 9);
        assert!(storage.exists(&stored.file_name).await.unwrap());

        assert!(storage.delete(&stored.file_name).await.unwrap());
        assert!(!storage.exists(&stored.file_name).await.unwrap());
        assert!(!storage.delete(&stored.file_name).await.unwrap());
    }

    #[tokio::test]
    async fn test_path_escape_rejected() {
        let storage = test_storage().await;
        assert!(matches!(
            storage.exists("../outside").await,
            Err(StorageError::InvalidFileName(_))
        ));
    }
}
