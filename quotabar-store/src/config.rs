//! Configuration management.
//!
//! Configuration is a JSON file at `<config dir>/quotabar/config.json`.
//! Every field has a default, so a missing file or a partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Default usage page.
pub const DEFAULT_USAGE_URL: &str = "https://claude.ai/settings/usage";

/// Default Admin API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Shortest allowed refresh interval.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 30;

/// Accepted values for `general.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ============================================================================
// Config Types
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Usage page acquisition.
    #[serde(default)]
    pub scrape: ScrapeConfig,
    /// Admin API access.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Refresh interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Whether threshold alerts are emitted.
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Percentage at which a warning fires.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u8,
    /// Percentage at which a critical alert fires.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u8,
    /// Log level for QuotaBar's own events when `--verbose` is not given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Settings for rendering the usage page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Usage page URL.
    #[serde(default = "default_usage_url")]
    pub usage_url: String,
    /// Headless render command, program first. `{url}` is replaced by the
    /// page URL.
    #[serde(default)]
    pub render_command: Option<Vec<String>>,
    /// Seconds to wait for rendered text.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
}

/// Settings for the Admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Environment variable holding the admin key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_warning_threshold() -> u8 {
    80
}

fn default_critical_threshold() -> u8 {
    95
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_usage_url() -> String {
    DEFAULT_USAGE_URL.to_string()
}

fn default_render_timeout() -> u64 {
    30
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_ADMIN_KEY".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            notifications: true,
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            usage_url: default_usage_url(),
            render_command: None,
            render_timeout_secs: default_render_timeout(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

// ============================================================================
// Loading & Saving
// ============================================================================

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// See [`load_from`](Self::load_from).
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads and validates configuration from `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let config = match load_json::<Self>(path).await {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks value ranges and URLs.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        let general = &self.general;
        if general.critical_threshold > 100 {
            return Err(StoreError::Config(format!(
                "critical_threshold must be at most 100, got {}",
                general.critical_threshold
            )));
        }
        if general.warning_threshold == 0 || general.warning_threshold >= general.critical_threshold {
            return Err(StoreError::Config(format!(
                "warning_threshold must be between 1 and critical_threshold ({}), got {}",
                general.critical_threshold, general.warning_threshold
            )));
        }
        if general.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            return Err(StoreError::Config(format!(
                "refresh_interval_secs must be at least {MIN_REFRESH_INTERVAL_SECS}, got {}",
                general.refresh_interval_secs
            )));
        }
        if !LOG_LEVELS.contains(&general.log_level.to_lowercase().as_str()) {
            return Err(StoreError::Config(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                general.log_level
            )));
        }

        let scrape = &self.scrape;
        if scrape.render_timeout_secs == 0 {
            return Err(StoreError::Config("render_timeout_secs must be positive".to_string()));
        }
        if scrape.render_command.as_ref().is_some_and(Vec::is_empty) {
            return Err(StoreError::Config("render_command must not be empty".to_string()));
        }

        check_url("scrape.usage_url", &scrape.usage_url)?;
        check_url("billing.api_base_url", &self.billing.api_base_url)?;

        if self.billing.api_key_env.trim().is_empty() {
            return Err(StoreError::Config("billing.api_key_env must not be empty".to_string()));
        }
        Ok(())
    }

    /// Refresh interval as a duration.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.general.refresh_interval_secs)
    }

    /// Render timeout as a duration.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape.render_timeout_secs)
    }
}

fn check_url(field: &str, value: &str) -> Result<(), StoreError> {
    let url = Url::parse(value).map_err(|e| StoreError::Config(format!("{field}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::Config(format!(
            "{field}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
