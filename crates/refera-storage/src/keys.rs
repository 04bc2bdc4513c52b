//! Shared key generation for storage backends.
//!
//! Key format: `{user_id}/{epoch_millis}-{token}.pdf`. The timestamp plus a
//! fresh random token makes keys collision-resistant across concurrent
//! uploads by the same user (multiple tabs, rapid retries).

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};

const TOKEN_LEN: usize = 12;

/// Generate a fresh random token for one upload. Never reuse a token across
/// attempts; each call must produce a new one.
pub fn random_token() -> String {
    Alphanumeric
        .sample_string(&mut rand::rng(), TOKEN_LEN)
        .to_lowercase()
}

/// Build the object key for a referral document owned by `user_id`.
pub fn object_key(user_id: &str, uploaded_at: DateTime<Utc>, token: &str) -> String {
    format!("{}/{}-{}.pdf", user_id, uploaded_at.timestamp_millis(), token)
}
