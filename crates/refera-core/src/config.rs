//! Configuration module
//!
//! Environment-driven configuration for the API and services: database,
//! storage backend selection, webhook endpoint, authentication, and upload
//! limits. Values come from the process environment (a `.env` file is loaded
//! by the binary before construction).

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted referral document size: 10 MiB.
pub const DEFAULT_MAX_REFERRAL_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    // Webhook configuration
    pub webhook_url: String,
    pub webhook_timeout_seconds: u64,
    // Upload limits
    pub max_referral_size_bytes: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let webhook_url = env::var("WEBHOOK_URL").context("WEBHOOK_URL must be set")?;

        let storage_backend = env_or("STORAGE_BACKEND", "local")
            .parse::<StorageBackend>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let cors_origins = env_opt("CORS_ORIGINS")
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?,
            jwt_secret,
            storage_backend,
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            webhook_url,
            webhook_timeout_seconds: env_parse(
                "WEBHOOK_TIMEOUT_SECONDS",
                DEFAULT_WEBHOOK_TIMEOUT_SECS,
            )?,
            max_referral_size_bytes: env_parse(
                "MAX_REFERRAL_SIZE_BYTES",
                DEFAULT_MAX_REFERRAL_SIZE_BYTES,
            )?,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn validate(&self) -> Result<()> {
        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    bail!("Local storage requires LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL");
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() || self.s3_region.is_none() {
                    bail!("S3 storage requires S3_BUCKET and S3_REGION");
                }
            }
        }

        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://") {
            bail!("WEBHOOK_URL must be an http(s) URL");
        }

        if self.is_production() && self.jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 characters in production");
        }

        if self.max_referral_size_bytes == 0 {
            bail!("MAX_REFERRAL_SIZE_BYTES must be greater than zero");
        }

        Ok(())
    }
}
