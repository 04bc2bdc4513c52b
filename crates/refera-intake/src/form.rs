//! Upload form controller.
//!
//! A UI-agnostic state machine around one pipeline call: it gatekeeps file
//! selection (PDF only, size cap), tracks submission state and progress, and
//! surfaces pipeline errors as display strings. The embedding surface renders
//! the four pieces of state; this type owns their transitions.

use std::sync::Arc;
use std::time::Duration;

use refera_core::config::DEFAULT_MAX_REFERRAL_SIZE_BYTES;
use refera_storage::SharedProgress;
use uuid::Uuid;

use crate::pipeline::{IntakeService, UploadRequest, PDF_MIME_TYPE};
use crate::traits::Identity;

/// Delay after a successful upload before completion is signaled, so a 100%
/// progress state can render before the transition.
const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct UploadFormConfig {
    pub max_file_size: usize,
    pub completion_delay: Duration,
}

impl Default for UploadFormConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_REFERRAL_SIZE_BYTES,
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

/// A file accepted by [`UploadForm::select_file`].
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Form state around one referral submission.
pub struct UploadForm {
    config: UploadFormConfig,
    selected: Option<SelectedFile>,
    error: Option<String>,
    uploading: bool,
    progress: Arc<SharedProgress>,
}

impl UploadForm {
    pub fn new(config: UploadFormConfig) -> Self {
        Self {
            config,
            selected: None,
            error: None,
            uploading: false,
            progress: Arc::new(SharedProgress::new()),
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Last reported progress percent. Readable while a submission is in
    /// flight via the shared handle.
    pub fn progress_percent(&self) -> u8 {
        self.progress.percent()
    }

    /// Handle for observing progress during an in-flight submission.
    pub fn progress_handle(&self) -> Arc<SharedProgress> {
        Arc::clone(&self.progress)
    }

    /// Validate and accept a file. Rejection sets a human-readable error and
    /// leaves no file selected.
    pub fn select_file(&mut self, file_name: &str, content_type: &str, data: Vec<u8>) -> bool {
        if self.uploading {
            return false;
        }

        if content_type != PDF_MIME_TYPE {
            self.selected = None;
            self.error = Some("Only PDF documents can be uploaded".to_string());
            return false;
        }

        if data.len() > self.config.max_file_size {
            self.selected = None;
            self.error = Some(format!(
                "The document must be {} MiB or smaller",
                self.config.max_file_size / 1024 / 1024
            ));
            return false;
        }

        self.selected = Some(SelectedFile {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        self.error = None;
        self.progress = Arc::new(SharedProgress::new());
        true
    }

    /// Reset selection, error, and progress together. Unavailable while a
    /// submission is in flight.
    pub fn clear(&mut self) -> bool {
        if self.uploading {
            return false;
        }
        self.selected = None;
        self.error = None;
        self.progress = Arc::new(SharedProgress::new());
        true
    }

    /// Submit the selected file through the pipeline.
    ///
    /// On success, returns the referral id after the configured completion
    /// delay and resets the form. On failure, keeps the selection, surfaces
    /// the pipeline's message, and returns `None`.
    pub async fn submit(
        &mut self,
        service: &IntakeService,
        identity: &dyn Identity,
        client_id: Option<String>,
        clients_page: bool,
    ) -> Option<Uuid> {
        if self.uploading {
            return None;
        }

        let Some(selected) = self.selected.clone() else {
            self.error = Some("Select a PDF document before submitting".to_string());
            return None;
        };

        self.uploading = true;
        self.error = None;
        self.progress = Arc::new(SharedProgress::new());

        let request = UploadRequest {
            data: selected.data,
            file_name: selected.file_name,
            content_type: selected.content_type,
            client_id,
            clients_page,
        };

        let result = service
            .upload(request, identity, self.progress.as_ref())
            .await;

        self.uploading = false;

        match result {
            Ok(receipt) => {
                // Let the 100% state render before signaling completion.
                tokio::time::sleep(self.config.completion_delay).await;
                self.selected = None;
                Some(receipt.referral_id)
            }
            Err(failure) => {
                self.error = Some(failure.to_string());
                None
            }
        }
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new(UploadFormConfig::default())
    }
}
