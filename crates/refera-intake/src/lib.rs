//! Refera Intake Library
//!
//! The referral upload pipeline and its form controller. The pipeline takes
//! one validated PDF and produces a persisted, notified referral, or a
//! categorized failure with an explicit compensation tag:
//!
//! auth check, object upload, metadata insert, webhook notification
//!
//! The sequence is strictly ordered with no retries and exactly one
//! compensating action: the object delete after a failed insert. A webhook
//! failure marks the record `failed` but keeps it as an audit trail.

pub mod form;
pub mod notify;
pub mod outcome;
pub mod pipeline;
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use form::{UploadForm, UploadFormConfig};
pub use notify::{HttpNotifier, HttpNotifierConfig};
pub use outcome::{Compensation, Stage, UploadFailure, UploadReceipt};
pub use pipeline::{IntakeService, UploadRequest};
pub use traits::{Identity, Notifier, ReferralNotification, ReferralStore};
