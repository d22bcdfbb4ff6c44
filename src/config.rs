//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;
use crate::format::CurrencyStyle;
use crate::stream::{ReconnectPolicy, StreamOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Campaign API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Live stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_offline_delay")]
    pub offline_delay_ms: u64,

    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_offline_delay() -> u64 {
    2000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            offline_delay_ms: default_offline_delay(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Currency style of the live metrics card
    #[serde(default)]
    pub currency: CurrencyStyle,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load an explicit file, or fall back to the default locations
    ///
    /// An explicit path that cannot be loaded is an error; a broken file in a
    /// default location is skipped with a warning.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first of `paths` that exists and parses
    ///
    /// Broken files are skipped with a warning; with none usable, defaults
    /// plus environment overrides are returned.
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Config file locations, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("campaign-pulse").join("config.toml")),
            Some(PathBuf::from("./campaign-pulse.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Settings for the REST client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout: Duration::from_secs(self.api.request_timeout_secs),
        }
    }

    /// Settings for live stream handlers
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            offline_delay: Duration::from_millis(self.stream.offline_delay_ms),
            reconnect: self.stream.reconnect,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(url) = var("CAMPAIGN_PULSE_API_URL") {
            self.api.base_url = url;
        }

        // Stream overrides
        if let Some(delay) = var("CAMPAIGN_PULSE_OFFLINE_DELAY_MS") {
            match delay.parse() {
                Ok(ms) => self.stream.offline_delay_ms = ms,
                Err(_) => tracing::warn!(value = %delay, "Ignoring invalid CAMPAIGN_PULSE_OFFLINE_DELAY_MS"),
            }
        }
        if let Some(policy) = var("CAMPAIGN_PULSE_RECONNECT") {
            match policy.parse() {
                Ok(p) => self.stream.reconnect = p,
                Err(e) => tracing::warn!("Ignoring CAMPAIGN_PULSE_RECONNECT: {}", e),
            }
        }

        // Logging overrides
        if let Some(level) = var("CAMPAIGN_PULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CAMPAIGN_PULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Campaign Pulse Configuration
#
# Environment variables override these settings:
# - CAMPAIGN_PULSE_API_URL
# - CAMPAIGN_PULSE_OFFLINE_DELAY_MS
# - CAMPAIGN_PULSE_RECONNECT
# - CAMPAIGN_PULSE_LOG_LEVEL
# - CAMPAIGN_PULSE_LOG_FORMAT

[api]
# Campaign API base URL
base_url = "http://localhost:4000"

# Timeout for one read request (seconds)
request_timeout_secs = 30

[stream]
# Time spent reconnecting before a live view is marked offline (ms)
offline_delay_ms = 2000

# After going offline: "reconnect" opens a new connection,
# "offline-only" stays offline until the view is reopened
reconnect = "reconnect"

[display]
# Live card currency: inr, usd, or inr-spaced
currency = "inr"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
