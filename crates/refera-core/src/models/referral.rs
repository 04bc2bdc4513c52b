use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a referral record.
///
/// `Pending` is set on insert. `Failed` marks a record whose downstream
/// webhook notification did not succeed; the record is kept as an audit
/// trail and can be retried or inspected manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Failed,
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferralStatus::Pending => write!(f, "pending"),
            ReferralStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ReferralStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReferralStatus::Pending),
            "failed" => Ok(ReferralStatus::Failed),
            other => Err(format!("Unknown referral status: {}", other)),
        }
    }
}

/// A persisted referral document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new referral record. The id and timestamps are
/// generated by the store.
#[derive(Debug, Clone)]
pub struct NewReferral {
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralResponse {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Referral> for ReferralResponse {
    fn from(referral: Referral) -> Self {
        ReferralResponse {
            id: referral.id,
            file_name: referral.file_name,
            file_size: referral.file_size,
            mime_type: referral.mime_type,
            status: referral.status,
            created_at: referral.created_at,
        }
    }
}
