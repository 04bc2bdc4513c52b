//! Application state shared across handlers.

use refera_core::Config;
use refera_db::ReferralRepository;
use refera_intake::IntakeService;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub referrals: ReferralRepository,
    pub intake: IntakeService,
}
