//! Mock collaborators for pipeline and form tests.
//!
//! Each mock records the calls it receives and can be constructed to fail,
//! so tests can assert exactly which remote effects a pipeline run produced.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use refera_core::models::{NewReferral, Referral, ReferralStatus};
use refera_core::AppError;
use refera_storage::{ProgressSink, Storage, StorageBackend, StorageError, StorageResult, StoredObject};
use uuid::Uuid;

use crate::traits::{Identity, Notifier, ReferralNotification, ReferralStore};

/// In-memory storage that records uploads and deletes.
///
/// Uploads emit a fixed progress ramp ending at 100 so forwarding can be
/// asserted.
#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    fail_upload: bool,
    fail_delete: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    /// Keys passed to `upload`, in order.
    pub fn upload_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Keys passed to `delete`, in order.
    pub fn delete_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
        progress: &dyn ProgressSink,
    ) -> StorageResult<StoredObject> {
        self.uploads.lock().unwrap().push(key.to_string());

        if self.fail_upload {
            return Err(StorageError::UploadFailed("mock upload failure".to_string()));
        }

        {
            let mut objects = self.objects.lock().unwrap();
            if objects.contains_key(key) {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            objects.insert(key.to_string(), data);
        }

        for percent in [25, 50, 75, 100] {
            progress.report(percent);
        }

        Ok(StoredObject {
            key: key.to_string(),
            url: format!("https://storage.example.com/{}", key),
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());

        if self.fail_delete {
            return Err(StorageError::DeleteFailed("mock delete failure".to_string()));
        }

        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// In-memory referral store recording inserts and status updates.
#[derive(Default)]
pub struct MockReferralStore {
    created: Mutex<Vec<Referral>>,
    marked_failed: Mutex<Vec<Uuid>>,
    fail_create: bool,
    fail_mark: bool,
}

impl MockReferralStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_mark() -> Self {
        Self {
            fail_mark: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<Referral> {
        self.created.lock().unwrap().clone()
    }

    pub fn marked_failed(&self) -> Vec<Uuid> {
        self.marked_failed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferralStore for MockReferralStore {
    async fn create(&self, referral: NewReferral) -> Result<Referral, AppError> {
        if self.fail_create {
            return Err(AppError::Internal("mock insert failure".to_string()));
        }

        let now = Utc::now();
        let created = Referral {
            id: Uuid::new_v4(),
            file_path: referral.file_path,
            file_name: referral.file_name,
            file_size: referral.file_size,
            mime_type: referral.mime_type,
            status: ReferralStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.created.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), AppError> {
        if self.fail_mark {
            return Err(AppError::Internal("mock update failure".to_string()));
        }
        self.marked_failed.lock().unwrap().push(id);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Referral>, AppError> {
        Ok(self
            .created
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }
}

/// Notifier recording delivered payloads.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<ReferralNotification>>,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<ReferralNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, notification: &ReferralNotification) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Notification("mock webhook failure".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Identity with a fixed answer.
pub struct MockIdentity {
    user: Option<String>,
}

impl MockIdentity {
    pub fn user(id: &str) -> Self {
        Self {
            user: Some(id.to_string()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl Identity for MockIdentity {
    async fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}

/// Progress sink recording every reported value, in order.
#[derive(Default)]
pub struct RecordingProgress(Mutex<Vec<u8>>);

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<u8> {
        self.0.lock().unwrap().last().copied()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, percent: u8) {
        self.0.lock().unwrap().push(percent);
    }
}
