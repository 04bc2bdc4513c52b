//! Collaborator seams for the upload pipeline.
//!
//! The pipeline orders calls across four external collaborators: an identity
//! provider, object storage (see `refera_storage::Storage`), a referral
//! store, and a webhook notifier. Each is a trait so the pipeline is
//! testable without a live session, database, or network.

use async_trait::async_trait;
use refera_core::models::{NewReferral, Referral};
use refera_core::AppError;
use serde::Serialize;
use uuid::Uuid;

/// Resolves the authenticated user for the current call, if any.
///
/// Modeled as an explicit value passed into the pipeline rather than ambient
/// process state.
#[async_trait]
pub trait Identity: Send + Sync {
    /// The current user's identifier, or `None` when nobody is signed in.
    async fn current_user(&self) -> Option<String>;
}

/// Persistence seam for referral records.
#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// Insert a new referral with `status = pending`; the store generates the id.
    async fn create(&self, referral: NewReferral) -> Result<Referral, AppError>;

    /// Set an existing referral's status to `failed`.
    async fn mark_failed(&self, id: Uuid) -> Result<(), AppError>;

    /// Fetch a referral by id.
    async fn get(&self, id: Uuid) -> Result<Option<Referral>, AppError>;
}

/// Payload POSTed to the downstream automation webhook.
///
/// `client_id` carries the literal sentinel `"-1"` for uploads from the
/// clients page, meaning "no specific client".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralNotification {
    pub id: Uuid,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

/// Outbound notification seam. Success is a 2xx response; the response body
/// is not consumed.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &ReferralNotification) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_wire_format() {
        let id = Uuid::new_v4();
        let notification = ReferralNotification {
            id,
            client_id: Some("-1".to_string()),
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["clientId"], "-1");
    }

    #[test]
    fn test_notification_without_client() {
        let notification = ReferralNotification {
            id: Uuid::new_v4(),
            client_id: None,
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert!(json["clientId"].is_null());
    }
}
