//! Bearer JWT authentication.
//!
//! The upload endpoint never rejects at the HTTP layer for a missing token;
//! the extractor resolves to an anonymous identity and the pipeline's
//! authentication stage produces the 401. This keeps one code path for
//! "who is uploading" regardless of transport.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use refera_intake::Identity;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: usize,
}

/// The authenticated user id, if a valid Bearer token was presented.
pub struct MaybeUser(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| decode_user(token, &state.config.jwt_secret));

        Ok(MaybeUser(user))
    }
}

fn decode_user(token: &str, secret: &str) -> Option<String> {
    match decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            None
        }
    }
}

/// Adapter from the extracted user to the pipeline's identity seam.
pub struct BearerIdentity {
    user: Option<String>,
}

impl BearerIdentity {
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }
}

#[async_trait]
impl Identity for BearerIdentity {
    async fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}
