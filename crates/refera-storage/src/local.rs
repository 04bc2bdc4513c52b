use crate::progress::{percent_of, ProgressSink};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Write granularity for uploads; each written chunk produces one progress
/// report.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/refera/documents")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys containing path traversal sequences or a leading slash are
    /// rejected so a key can never escape the base storage directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(key))
    }

    /// Generate public URL for an object
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Best-effort removal of a partially written file. The write error stays
/// the primary failure; a removal failure is only logged.
async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove partially written file"
            );
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
        progress: &dyn ProgressSink,
    ) -> StorageResult<StoredObject> {
        let path = self.key_to_path(key)?;
        let total = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // create_new gives collision-as-error semantics: an existing key is
        // never overwritten.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(key.to_string())
                } else {
                    StorageError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    ))
                }
            })?;

        let write_result = async {
            let mut written = 0usize;
            for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
                file.write_all(chunk).await?;
                written += chunk.len();
                progress.report(percent_of(written, total));
            }
            if total == 0 {
                progress.report(100);
            }
            file.sync_all().await
        }
        .await;

        if let Err(e) = write_result {
            // A failed write must not leave a partial object under the key.
            remove_partial(&path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url,
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct RecordingProgress(Mutex<Vec<u8>>);

    impl RecordingProgress {
        fn new() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn values(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingProgress {
        fn report(&self, percent: u8) {
            self.0.lock().unwrap().push(percent);
        }
    }

    async fn test_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_download() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let data = b"%PDF-1.7 test data".to_vec();
        let stored = storage
            .upload("u1/100-abc.pdf", "application/pdf", data.clone(), &NoopProgress)
            .await
            .unwrap();

        assert_eq!(stored.key, "u1/100-abc.pdf");
        assert_eq!(stored.url, "http://localhost:3000/files/u1/100-abc.pdf");

        let downloaded = storage.download(&stored.key).await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_upload_key_collision_is_error() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        storage
            .upload("u1/100-abc.pdf", "application/pdf", b"first".to_vec(), &NoopProgress)
            .await
            .unwrap();

        let result = storage
            .upload("u1/100-abc.pdf", "application/pdf", b"second".to_vec(), &NoopProgress)
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // Original bytes untouched
        let data = storage.download("u1/100-abc.pdf").await.unwrap();
        assert_eq!(data, b"first");
    }

    #[tokio::test]
    async fn test_upload_reports_monotonic_progress_ending_at_100() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let progress = RecordingProgress::new();
        // Three chunks worth of data
        let data = vec![7u8; UPLOAD_CHUNK_SIZE * 2 + 1024];
        storage
            .upload("u1/200-def.pdf", "application/pdf", data, &progress)
            .await
            .unwrap();

        let values = progress.values();
        assert!(!values.is_empty());
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*values.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_remove_partial_deletes_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("u1").join("100-abc.pdf");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"partial bytes").await.unwrap();

        remove_partial(&path).await;
        assert!(!fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_partial_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("u1").join("missing.pdf");

        // Must not panic or error when there is nothing to remove.
        remove_partial(&path).await;
        assert!(!fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        assert!(storage.delete("u1/nonexistent.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        storage
            .upload("u1/300-xyz.pdf", "application/pdf", b"data".to_vec(), &NoopProgress)
            .await
            .unwrap();

        assert!(storage.exists("u1/300-xyz.pdf").await.unwrap());
        assert!(!storage.exists("u1/missing.pdf").await.unwrap());
    }
}
