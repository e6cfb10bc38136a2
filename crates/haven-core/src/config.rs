//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.
//! Server bind address and database URL are read directly from the
//! environment by the binary; this covers the webhook and social tunables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub social: SocialConfig,
}

/// Telephony webhook configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    /// Delay before the single orphan-recording re-lookup, in milliseconds.
    /// Tolerates replication lag between the provider and our replica.
    #[serde(default = "default_recording_retry_delay")]
    pub recording_retry_delay_ms: u64,
}

fn default_recording_retry_delay() -> u64 {
    1000
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            recording_retry_delay_ms: default_recording_retry_delay(),
        }
    }
}

/// Social publishing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SocialConfig {
    /// Token bucket capacity per platform
    #[serde(default = "default_bucket_capacity")]
    pub bucket_capacity: u32,

    /// Token refill rate per platform, tokens per minute
    #[serde(default = "default_refill_per_minute")]
    pub refill_per_minute: u32,

    /// Platform publish endpoints, keyed by platform name
    /// (e.g. `social.endpoints.facebook = "https://graph.example.com/posts"`)
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

fn default_bucket_capacity() -> u32 {
    5
}

fn default_refill_per_minute() -> u32 {
    60
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            bucket_capacity: default_bucket_capacity(),
            refill_per_minute: default_refill_per_minute(),
            endpoints: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("webhook.recording_retry_delay_ms", 1000)?
            .set_default("social.bucket_capacity", 5)?
            .set_default("social.refill_per_minute", 60)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with HAVEN_ prefix
            .add_source(
                Environment::with_prefix("HAVEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("HAVEN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
