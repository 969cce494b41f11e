//! Storage backend trait

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::StorageError;

/// Metadata for a stored upload
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// Name the file is stored under (unique)
    pub file_name: String,
    /// Name the client uploaded the file as
    pub original_name: String,
    /// Declared content type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    /// Public URL path for the file
    pub url: String,
}

/// Storage backend trait
///
/// Implementations persist uploaded files and hand back the public
/// path they are served under.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an uploaded file under a unique name
    async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredFile, StorageError>;

    /// Check if a stored file exists
    async fn exists(&self, file_name: &str) -> Result<bool, StorageError>;

    /// Delete a stored file
    async fn delete(&self, file_name: &str) -> Result<bool, StorageError>;
}

/// Sanitize a client-supplied file name
///
/// Anything outside `[A-Za-z0-9._-]` becomes a dash. Path separators are
/// covered by the same rule, so a stored name can never escape the
/// uploads directory.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
