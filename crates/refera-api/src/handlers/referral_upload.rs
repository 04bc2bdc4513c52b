use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use refera_core::models::ReferralResponse;
use refera_core::AppError;
use refera_intake::pipeline::UploadRequest;
use refera_storage::NoopProgress;

use crate::auth::{BearerIdentity, MaybeUser};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Parsed multipart form for a referral upload.
struct UploadForm {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
    client_id: Option<String>,
    clients_page: bool,
}

async fn parse_multipart(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut client_id: Option<String> = None;
    let mut clients_page = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("referral.pdf")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                file = Some((data.to_vec(), file_name, content_type));
            }
            Some("client_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid client_id: {}", e)))?;
                if !value.is_empty() {
                    client_id = Some(value);
                }
            }
            Some("clients_page") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid clients_page: {}", e)))?;
                clients_page = value == "true" || value == "1";
            }
            _ => {}
        }
    }

    let (data, file_name, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;

    Ok(UploadForm {
        data,
        file_name,
        content_type,
        client_id,
        clients_page,
    })
}

#[utoipa::path(
    post,
    path = "/api/v0/referrals",
    tag = "referrals",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Referral uploaded successfully", body = ReferralResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 502, description = "Webhook delivery failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_referral(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    multipart: Multipart,
) -> Result<Json<ReferralResponse>, HttpAppError> {
    let form = parse_multipart(multipart).await.map_err(HttpAppError::from)?;

    // Size is enforced here, before the pipeline runs; the body limit layer
    // is a coarser backstop.
    if form.data.len() > state.config.max_referral_size_bytes {
        let max_mib = state.config.max_referral_size_bytes / 1024 / 1024;
        return Err(HttpAppError::from(AppError::PayloadTooLarge(format!(
            "The document must be {} MiB or smaller",
            max_mib
        ))));
    }

    let request = UploadRequest {
        data: form.data,
        file_name: form.file_name,
        content_type: form.content_type,
        client_id: form.client_id,
        clients_page: form.clients_page,
    };

    let identity = BearerIdentity::new(user);
    let receipt = state
        .intake
        .upload(request, &identity, &NoopProgress)
        .await?;

    let referral = state
        .referrals
        .get_referral_by_id(receipt.referral_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Referral not found".to_string())))?;

    Ok(Json(ReferralResponse::from(referral)))
}
