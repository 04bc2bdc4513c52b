use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use refera_core::models::ReferralResponse;
use refera_core::AppError;
use uuid::Uuid;

use crate::auth::MaybeUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/referrals/{id}",
    tag = "referrals",
    params(
        ("id" = Uuid, Path, description = "Referral ID")
    ),
    responses(
        (status = 200, description = "Referral found", body = ReferralResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Referral not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_referral(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferralResponse>, HttpAppError> {
    if user.is_none() {
        return Err(HttpAppError::from(AppError::Unauthorized(
            "You must be signed in to view referrals".to_string(),
        )));
    }

    let referral = state
        .referrals
        .get_referral_by_id(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Referral not found".to_string())))?;

    Ok(Json(ReferralResponse::from(referral)))
}
