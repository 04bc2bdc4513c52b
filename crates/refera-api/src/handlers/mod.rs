pub mod health;
pub mod referral_get;
pub mod referral_upload;
