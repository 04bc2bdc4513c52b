//! Webhook notifier implementation.
//!
//! Delivers one referral notification to a fixed HTTPS endpoint. Success is
//! a 2xx status; the response body is not consumed. No retries here: a
//! failed delivery surfaces to the pipeline, which marks the record instead.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use refera_core::AppError;
use reqwest::Client;

use crate::traits::{Notifier, ReferralNotification};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the webhook notifier
#[derive(Clone, Debug)]
pub struct HttpNotifierConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl HttpNotifierConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Notifier that POSTs JSON to the configured automation endpoint.
#[derive(Clone)]
pub struct HttpNotifier {
    http_client: Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(config: HttpNotifierConfig) -> anyhow::Result<Self> {
        if config.endpoint.is_empty() {
            bail!("Webhook endpoint must not be empty");
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client for webhook notifier")?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[tracing::instrument(skip(self, notification), fields(referral_id = %notification.id))]
    async fn notify(&self, notification: &ReferralNotification) -> Result<(), AppError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("User-Agent", "Refera-Webhook/1.0")
            .json(notification)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(
                referral_id = %notification.id,
                status_code = status.as_u16(),
                "Webhook delivered successfully"
            );
            Ok(())
        } else {
            Err(AppError::Notification(format!(
                "Webhook returned non-2xx status: {}",
                status.as_u16()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_rejected_at_construction() {
        let result = HttpNotifier::new(HttpNotifierConfig::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults_timeout() {
        let config = HttpNotifierConfig::new("https://hooks.example.com/referral");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(HttpNotifier::new(config).is_ok());
    }
}
