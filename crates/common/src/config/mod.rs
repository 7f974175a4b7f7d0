//! Configuration management for votewatch tools
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - The legacy `TVFY_API_KEY` variable for the API key
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the voting-records API key
pub const API_KEY_ENV: &str = "TVFY_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Voting-records API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Local snapshot configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API base URL
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// API key, sent as the `key` query parameter
    pub key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Retry budget for connection failures, in seconds (0 disables retries)
    #[serde(default = "default_retry_max_elapsed")]
    pub retry_max_elapsed_secs: u64,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding divisions.json, senate.json and house.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name attached to log lines
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_api_base() -> String { crate::DEFAULT_API_BASE.to_string() }
fn default_api_timeout() -> u64 { 30 }
fn default_retry_max_elapsed() -> u64 { 30 }
fn default_user_agent() -> String { format!("votewatch/{}", crate::VERSION) }
fn default_data_dir() -> PathBuf { PathBuf::from(crate::DEFAULT_DATA_DIR) }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "votewatch".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            key: None,
            timeout_secs: default_api_timeout(),
            retry_max_elapsed_secs: default_retry_max_elapsed(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__STORAGE__DATA_DIR=/var/lib/votewatch
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let mut loaded: Self = config.try_deserialize()?;
        loaded.apply_legacy_env();
        Ok(loaded)
    }

    /// Load from a specific config file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let mut loaded: Self = config.try_deserialize()?;
        loaded.apply_legacy_env();
        Ok(loaded)
    }

    /// Fill `api.key` from `TVFY_API_KEY` when no other source set it
    fn apply_legacy_env(&mut self) {
        if self.api.key.is_none() {
            self.api.key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
    }

    /// Get the API key, failing when none is configured
    pub fn api_key(&self) -> crate::Result<&str> {
        self.api
            .key
            .as_deref()
            .ok_or_else(|| crate::AppError::Configuration {
                message: format!("no API key configured (set {} or APP__API__KEY)", API_KEY_ENV),
            })
    }

}

impl ApiConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the retry budget as Duration
    pub fn retry_budget(&self) -> Duration {
        Duration::from_secs(self.retry_max_elapsed_secs)
    }
}
