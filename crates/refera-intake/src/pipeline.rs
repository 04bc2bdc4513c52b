//! The upload pipeline: auth check, object upload, record insert, notify.
//!
//! A strict sequence of four remote calls, each awaited before the next
//! begins, with no retries and no parallelism. Progress before 100% reflects
//! only the object-upload phase; the insert and webhook phases report no
//! intermediate progress.

use std::sync::Arc;

use chrono::Utc;
use refera_core::models::NewReferral;
use refera_storage::{keys, ProgressSink, Storage};

use crate::outcome::{Compensation, Stage, UploadFailure, UploadReceipt};
use crate::traits::{Identity, Notifier, ReferralNotification, ReferralStore};

/// MIME type accepted by the pipeline; everything else is rejected before
/// any remote call.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Sentinel client id meaning "no specific client" (clients-page uploads).
pub const NO_CLIENT_SENTINEL: &str = "-1";

/// One referral document submission.
///
/// Size policy is enforced by the caller (form or HTTP handler); the
/// pipeline itself only checks the MIME type.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub client_id: Option<String>,
    pub clients_page: bool,
}

impl UploadRequest {
    /// The client id carried by the webhook notification: the `"-1"`
    /// sentinel for clients-page uploads, otherwise the caller's value.
    pub fn resolved_client_id(&self) -> Option<String> {
        if self.clients_page {
            Some(NO_CLIENT_SENTINEL.to_string())
        } else {
            self.client_id.clone()
        }
    }
}

/// Orders the four remote calls of one referral upload and interprets their
/// results.
#[derive(Clone)]
pub struct IntakeService {
    storage: Arc<dyn Storage>,
    store: Arc<dyn ReferralStore>,
    notifier: Arc<dyn Notifier>,
}

impl IntakeService {
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<dyn ReferralStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            store,
            notifier,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// Never panics past this boundary: every failure path resolves to an
    /// [`UploadFailure`] carrying its stage and compensation tag.
    #[tracing::instrument(
        skip(self, request, identity, progress),
        fields(file_name = %request.file_name, size_bytes = request.data.len())
    )]
    pub async fn upload(
        &self,
        request: UploadRequest,
        identity: &dyn Identity,
        progress: &dyn ProgressSink,
    ) -> Result<UploadReceipt, UploadFailure> {
        // 1. Validation: PDF only, before any remote call.
        if request.content_type != PDF_MIME_TYPE {
            tracing::debug!(content_type = %request.content_type, "Rejected non-PDF upload");
            return Err(UploadFailure::new(
                Stage::Validation,
                "Only PDF documents can be uploaded",
            ));
        }

        // 2. Authentication: no identity, no side effects.
        let user_id = match identity.current_user().await {
            Some(user_id) => user_id,
            None => {
                tracing::debug!("Rejected upload without an authenticated user");
                return Err(UploadFailure::new(
                    Stage::Authentication,
                    "You must be signed in to upload a referral",
                ));
            }
        };

        // 3. Derive a collision-resistant key; the token is fresh per call.
        let key = keys::object_key(&user_id, Utc::now(), &keys::random_token());
        let file_size = request.data.len() as i64;
        let resolved_client_id = request.resolved_client_id();

        // 4. Object upload. Nothing exists yet, so failure needs no cleanup.
        let stored = self
            .storage
            .upload(&key, &request.content_type, request.data, progress)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Object upload failed");
                UploadFailure::new(Stage::Storage, "Failed to store the document")
            })?;

        // 5. Record insert. On failure the orphaned object is deleted; the
        // delete's own failure is logged only and never overrides the
        // persistence error.
        let new_referral = NewReferral {
            file_path: stored.key.clone(),
            file_name: request.file_name.clone(),
            file_size,
            mime_type: PDF_MIME_TYPE.to_string(),
        };

        let referral = match self.store.create(new_referral).await {
            Ok(referral) => referral,
            Err(e) => {
                tracing::error!(error = %e, key = %stored.key, "Referral insert failed after object upload");
                let compensation = match self.storage.delete(&stored.key).await {
                    Ok(()) => {
                        tracing::info!(key = %stored.key, "Deleted orphaned object after insert failure");
                        Compensation::ObjectDeleted
                    }
                    Err(delete_err) => {
                        tracing::warn!(
                            error = %delete_err,
                            key = %stored.key,
                            "Failed to delete orphaned object after insert failure"
                        );
                        Compensation::ObjectDeleteFailed
                    }
                };
                return Err(
                    UploadFailure::new(Stage::Persistence, "Failed to save the referral")
                        .with_compensation(compensation),
                );
            }
        };

        // 6-7. Webhook notification. On failure the record is kept and
        // marked failed so it can be retried or inspected later.
        let notification = ReferralNotification {
            id: referral.id,
            client_id: resolved_client_id,
        };

        if let Err(e) = self.notifier.notify(&notification).await {
            tracing::error!(error = %e, referral_id = %referral.id, "Webhook notification failed");
            let compensation = match self.store.mark_failed(referral.id).await {
                Ok(()) => Compensation::RecordMarkedFailed,
                Err(mark_err) => {
                    tracing::warn!(
                        error = %mark_err,
                        referral_id = %referral.id,
                        "Failed to mark referral as failed"
                    );
                    Compensation::None
                }
            };
            return Err(UploadFailure::new(
                Stage::Notification,
                "Failed to notify the referral service",
            )
            .with_compensation(compensation));
        }

        // 8. Done.
        progress.report(100);

        tracing::info!(
            referral_id = %referral.id,
            key = %stored.key,
            size_bytes = file_size,
            "Referral upload complete"
        );

        Ok(UploadReceipt {
            referral_id: referral.id,
            storage_key: stored.key,
        })
    }
}
