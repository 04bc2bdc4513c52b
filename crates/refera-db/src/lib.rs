//! Refera Database Layer
//!
//! Postgres repositories for referral records. The repository also implements
//! the intake crate's `ReferralStore` trait so the pipeline can persist
//! through it without depending on sqlx.

pub mod referrals;

pub use referrals::ReferralRepository;

/// Embedded migrations, run at startup by the API's database setup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
