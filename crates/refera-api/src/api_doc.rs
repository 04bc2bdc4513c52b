//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use refera_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Refera API",
        version = "0.1.0",
        description = "Referral document intake API (v0). Accepts PDF referral uploads, persists referral records, and notifies the downstream automation endpoint. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::referral_upload::upload_referral,
        handlers::referral_get::get_referral,
        handlers::health::health,
    ),
    components(schemas(
        models::ReferralResponse,
        models::ReferralStatus,
        error::ErrorResponse,
    )),
    tags(
        (name = "referrals", description = "Referral document upload and lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
