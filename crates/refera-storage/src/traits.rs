//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use crate::progress::ProgressSink;
use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A successfully written object: its key and public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// the intake pipeline can work against any backend without coupling to
/// implementation details.
///
/// **Key format:** keys are owner-scoped `{user_id}/{epoch_millis}-{token}.pdf`;
/// see the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload bytes under the given key.
    ///
    /// A key collision is an error (`AlreadyExists`), never an overwrite.
    /// The backend reports incremental transfer progress through `progress`
    /// as integer percent values in [0, 100].
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
        progress: &dyn ProgressSink,
    ) -> StorageResult<StoredObject>;

    /// Download an object by its storage key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its storage key. Deleting a missing object is ok.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
