//! # Engine Configuration
//!
//! Configuration management for the tracking sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARCELTRACK_CARRIER_BASE_URL=https://api.carrier.example/track     │
//! │     PARCELTRACK_DB_PATH=./parceltrack.db                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/parceltrack/sync.toml (Linux)                            │
//! │     ~/Library/Application Support/com.parceltrack.engine/sync.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │                                                                         │
//! │  Mutable runtime settings (webhook URL, retry-count override) are NOT  │
//! │  here — they live in the app_config table and are re-read on every     │
//! │  dispatch, so operators can change them without a restart.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [database]
//! path = "./parceltrack.db"
//!
//! [carrier]
//! base_url = "https://api.carrier.example/v1/track"
//! chunk_size = 50
//! batch_timeout_secs = 60
//! inter_chunk_delay_ms = 300
//! inter_store_delay_ms = 500
//!
//! [webhook]
//! timeout_secs = 30
//! default_retry_count = 3
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use parceltrack_core::CARRIER_CHUNK_SIZE;

// =============================================================================
// Database Settings
// =============================================================================

/// Location of the SQLite database file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "./parceltrack.db".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Carrier Settings
// =============================================================================

/// Carrier tracking API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierSettings {
    /// Base URL of the tracking endpoint.
    #[serde(default = "default_carrier_base_url")]
    pub base_url: String,

    /// Waybills per tracking call. The carrier caps this at 50.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Timeout for one batch tracking call (seconds).
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,

    /// Delay between consecutive chunk calls (milliseconds). Respects the
    /// carrier's implicit rate limits.
    #[serde(default = "default_inter_chunk_delay")]
    pub inter_chunk_delay_ms: u64,

    /// Delay between store groups (milliseconds).
    #[serde(default = "default_inter_store_delay")]
    pub inter_store_delay_ms: u64,
}

fn default_carrier_base_url() -> String {
    "https://api.carrier.example/v1/track".to_string()
}

fn default_chunk_size() -> usize {
    CARRIER_CHUNK_SIZE
}

fn default_batch_timeout() -> u64 {
    60
}

fn default_inter_chunk_delay() -> u64 {
    300
}

fn default_inter_store_delay() -> u64 {
    500
}

impl Default for CarrierSettings {
    fn default() -> Self {
        CarrierSettings {
            base_url: default_carrier_base_url(),
            chunk_size: default_chunk_size(),
            batch_timeout_secs: default_batch_timeout(),
            inter_chunk_delay_ms: default_inter_chunk_delay(),
            inter_store_delay_ms: default_inter_store_delay(),
        }
    }
}

// =============================================================================
// Webhook Settings
// =============================================================================

/// Webhook delivery settings. The endpoint URL itself is runtime config
/// (app_config table), not engine config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Timeout per delivery attempt (seconds).
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,

    /// Attempt ceiling when the app_config override is absent.
    #[serde(default = "default_retry_count")]
    pub default_retry_count: u32,
}

fn default_webhook_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

impl Default for WebhookSettings {
    fn default() -> Self {
        WebhookSettings {
            timeout_secs: default_webhook_timeout(),
            default_retry_count: default_retry_count(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Database location.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Carrier API settings.
    #[serde(default)]
    pub carrier: CarrierSettings,

    /// Webhook delivery settings.
    #[serde(default)]
    pub webhook: WebhookSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.carrier.chunk_size == 0 || self.carrier.chunk_size > CARRIER_CHUNK_SIZE {
            return Err(SyncError::InvalidConfig(format!(
                "chunk_size must be between 1 and {}, got {}",
                CARRIER_CHUNK_SIZE, self.carrier.chunk_size
            )));
        }

        let url = url::Url::parse(&self.carrier.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "Carrier base URL must be http(s), got: {}",
                self.carrier.base_url
            )));
        }

        if self.webhook.default_retry_count == 0 {
            return Err(SyncError::InvalidConfig(
                "default_retry_count must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("PARCELTRACK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = path;
        }

        if let Ok(url) = std::env::var("PARCELTRACK_CARRIER_BASE_URL") {
            debug!(url = %url, "Overriding carrier base URL from environment");
            self.carrier.base_url = url;
        }

        if let Ok(size) = std::env::var("PARCELTRACK_CHUNK_SIZE") {
            if let Ok(n) = size.parse::<usize>() {
                self.carrier.chunk_size = n;
            }
        }

        if let Ok(retries) = std::env::var("PARCELTRACK_WEBHOOK_RETRY_COUNT") {
            if let Ok(n) = retries.parse::<u32>() {
                self.webhook.default_retry_count = n;
            }
        }
    }

    /// Returns the platform default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "parceltrack", "engine")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.carrier.chunk_size, CARRIER_CHUNK_SIZE);
        assert_eq!(config.webhook.default_retry_count, 3);
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut config = SyncConfig::default();
        config.carrier.chunk_size = 51;
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_http_carrier_url_rejected() {
        let mut config = SyncConfig::default();
        config.carrier.base_url = "ftp://carrier.example".into();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));
    }

    #[test]
    fn test_env_overrides_beat_defaults() {
        std::env::set_var("PARCELTRACK_DB_PATH", "/tmp/env-override.db");
        std::env::set_var(
            "PARCELTRACK_CARRIER_BASE_URL",
            "https://env.carrier.example/track",
        );
        std::env::set_var("PARCELTRACK_CHUNK_SIZE", "25");
        std::env::set_var("PARCELTRACK_WEBHOOK_RETRY_COUNT", "5");

        // No config file at this path: defaults + env only.
        let config = SyncConfig::load(Some(PathBuf::from("./no-such-sync.toml"))).unwrap();

        std::env::remove_var("PARCELTRACK_DB_PATH");
        std::env::remove_var("PARCELTRACK_CARRIER_BASE_URL");
        std::env::remove_var("PARCELTRACK_CHUNK_SIZE");
        std::env::remove_var("PARCELTRACK_WEBHOOK_RETRY_COUNT");

        assert_eq!(config.database.path, "/tmp/env-override.db");
        assert_eq!(config.carrier.base_url, "https://env.carrier.example/track");
        assert_eq!(config.carrier.chunk_size, 25);
        assert_eq!(config.webhook.default_retry_count, 5);

        // Unparseable numeric overrides are ignored, not errors. Kept in
        // this test because the variables are process-global.
        std::env::set_var("PARCELTRACK_CHUNK_SIZE", "lots");
        let mut config = SyncConfig::default();
        config.apply_env_overrides();
        std::env::remove_var("PARCELTRACK_CHUNK_SIZE");
        assert_eq!(config.carrier.chunk_size, CARRIER_CHUNK_SIZE);
    }

    #[test]
    fn test_toml_roundtrip_with_partial_file() {
        let config: SyncConfig = toml::from_str(
            r#"
            [carrier]
            chunk_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.carrier.chunk_size, 25);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.webhook.timeout_secs, 30);
        assert_eq!(config.database.path, "./parceltrack.db");
    }
}
