//! Pipeline outcome types.
//!
//! Every failure carries its stage and a compensation tag so callers can see
//! exactly what state the system was left in. The two compensation branches
//! are asymmetric on purpose: an object without a record is deleted, a record
//! without a delivered notification is kept and marked `failed`.

use std::fmt;
use uuid::Uuid;

/// Pipeline stage at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Authentication,
    Storage,
    Persistence,
    Notification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Validation => write!(f, "validation"),
            Stage::Authentication => write!(f, "authentication"),
            Stage::Storage => write!(f, "storage"),
            Stage::Persistence => write!(f, "persistence"),
            Stage::Notification => write!(f, "notification"),
        }
    }
}

/// What compensating action ran (or was attempted) for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Nothing to undo; no remote state was created.
    None,
    /// The just-uploaded object was deleted.
    ObjectDeleted,
    /// The object delete itself failed; logged only, never surfaced.
    ObjectDeleteFailed,
    /// The referral record was kept and its status set to `failed`.
    RecordMarkedFailed,
}

/// A categorized pipeline failure.
///
/// The message is a short human-readable string safe to show to the end
/// user; raw transport and database detail stays in the logs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct UploadFailure {
    pub stage: Stage,
    pub compensation: Compensation,
    pub message: String,
}

impl UploadFailure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            compensation: Compensation::None,
            message: message.into(),
        }
    }

    pub fn with_compensation(mut self, compensation: Compensation) -> Self {
        self.compensation = compensation;
        self
    }
}

/// A successful pipeline run.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub referral_id: Uuid,
    pub storage_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_is_the_display() {
        let failure = UploadFailure::new(Stage::Storage, "Failed to store the document");
        assert_eq!(failure.to_string(), "Failed to store the document");
        assert_eq!(failure.compensation, Compensation::None);
    }

    #[test]
    fn test_with_compensation() {
        let failure = UploadFailure::new(Stage::Persistence, "Failed to save the referral")
            .with_compensation(Compensation::ObjectDeleted);
        assert_eq!(failure.stage, Stage::Persistence);
        assert_eq!(failure.compensation, Compensation::ObjectDeleted);
    }
}
