pub mod referral;

pub use referral::{NewReferral, Referral, ReferralResponse, ReferralStatus};
