//! Application setup and initialization
//!
//! All wiring lives here so main.rs stays a thin entry point.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use refera_core::Config;
use refera_db::ReferralRepository;
use refera_intake::{HttpNotifier, HttpNotifierConfig, IntakeService};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated"
    );

    let pool = database::setup_database(&config).await?;

    let storage = refera_storage::create_storage(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    let referrals = ReferralRepository::new(pool.clone());

    let notifier = HttpNotifier::new(HttpNotifierConfig {
        endpoint: config.webhook_url.clone(),
        timeout_seconds: config.webhook_timeout_seconds,
    })?;

    let intake = IntakeService::new(
        storage,
        Arc::new(referrals.clone()),
        Arc::new(notifier),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        pool,
        referrals,
        intake,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
