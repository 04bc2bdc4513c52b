//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! convert into `HttpAppError` via `From` so they render consistently
//! (status, JSON body, logging). Client-facing messages never carry raw
//! transport or database detail; that stays in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use refera_core::{AppError, ErrorMetadata};
use refera_intake::{Stage, UploadFailure};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper carrying everything needed to render one error response.
/// Exists because of orphan rules: IntoResponse cannot be implemented for
/// AppError directly.
#[derive(Debug)]
pub struct HttpAppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError {
            status: StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: err.error_code(),
            message: err.client_message(),
        }
    }
}

impl From<UploadFailure> for HttpAppError {
    fn from(failure: UploadFailure) -> Self {
        let (status, code) = match failure.stage {
            Stage::Validation => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Stage::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Stage::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            Stage::Persistence => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            Stage::Notification => (StatusCode::BAD_GATEWAY, "NOTIFICATION_ERROR"),
        };

        // Pipeline failure messages are already client-safe.
        HttpAppError {
            status,
            code,
            message: failure.message,
        }
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError::from(AppError::Internal(err.to_string()))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "Request failed");
        } else {
            tracing::warn!(code = self.code, error = %self.message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        });

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refera_intake::Compensation;

    #[test]
    fn test_app_error_status_mapping() {
        let err = HttpAppError::from(AppError::NotFound("Referral not found".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[test]
    fn test_upload_failure_stage_mapping() {
        let cases = [
            (Stage::Validation, StatusCode::BAD_REQUEST),
            (Stage::Authentication, StatusCode::UNAUTHORIZED),
            (Stage::Storage, StatusCode::INTERNAL_SERVER_ERROR),
            (Stage::Persistence, StatusCode::INTERNAL_SERVER_ERROR),
            (Stage::Notification, StatusCode::BAD_GATEWAY),
        ];

        for (stage, status) in cases {
            let failure = UploadFailure::new(stage, "boom").with_compensation(Compensation::None);
            assert_eq!(HttpAppError::from(failure).status, status);
        }
    }

    #[test]
    fn test_upload_failure_message_preserved() {
        let failure = UploadFailure::new(Stage::Storage, "Failed to store the document");
        let err = HttpAppError::from(failure);
        assert_eq!(err.message, "Failed to store the document");
    }
}
