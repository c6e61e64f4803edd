//! # Sync Error Types
//!
//! Error types for tracking sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌──────────────────┐  ┌───────────────────────┐  │
//! │  │  Configuration  │  │    Transient     │  │     Persistence       │  │
//! │  │                 │  │                  │  │                       │  │
//! │  │  InvalidConfig  │  │  CarrierRequest  │  │  DatabaseError        │  │
//! │  │  MissingWebhook │  │  WebhookDelivery │  │  (fatal to the run    │  │
//! │  │  Credential     │  │  (retry / skip   │  │   when the DB itself  │  │
//! │  │  Unavailable    │  │   per item)      │  │   is unavailable)     │  │
//! │  └─────────────────┘  └──────────────────┘  └───────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │   Run Control   │   RunInProgress — the mutual-exclusion guard       │
//! │  └─────────────────┘   rejection, reported immediately, never queued    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use parceltrack_core::LifecycleClass;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all sync-pass failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// No webhook URL configured. Delivery is skipped, not failed.
    #[error("No webhook URL configured")]
    MissingWebhookUrl,

    /// The store has no usable carrier credential.
    #[error("No active carrier credential for store '{account_code}'")]
    CredentialUnavailable { account_code: String },

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transient Network Errors
    // =========================================================================
    /// A carrier tracking request failed (timeout, non-2xx, bad body).
    /// Contained at the chunk boundary and counted, never re-thrown.
    #[error("Carrier request failed: {0}")]
    CarrierRequestFailed(String),

    /// A webhook delivery attempt failed.
    #[error("Webhook delivery failed after {attempts} attempt(s): {last_error}")]
    WebhookDeliveryFailed { attempts: u32, last_error: String },

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    /// Failed to serialize or deserialize a payload.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // =========================================================================
    // Run Control
    // =========================================================================
    /// A sync pass for this lifecycle class is already running.
    #[error("A {lifecycle} sync is already in progress")]
    RunInProgress { lifecycle: LifecycleClass },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal engine error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns true for transient failures worth retrying or skipping
    /// per item rather than failing the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::CarrierRequestFailed(_) | SyncError::WebhookDeliveryFailed { .. }
        )
    }

    /// Returns true for configuration-absence errors that short-circuit
    /// only the dependent operation.
    pub fn is_config_absence(&self) -> bool {
        matches!(
            self,
            SyncError::MissingWebhookUrl | SyncError::CredentialUnavailable { .. }
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<parceltrack_db::DbError> for SyncError {
    fn from(err: parceltrack_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::CarrierRequestFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SyncError::CarrierRequestFailed("timeout".into()).is_transient());
        assert!(SyncError::WebhookDeliveryFailed {
            attempts: 3,
            last_error: "500".into()
        }
        .is_transient());
        assert!(!SyncError::DatabaseError("gone".into()).is_transient());
    }

    #[test]
    fn test_config_absence_classification() {
        assert!(SyncError::MissingWebhookUrl.is_config_absence());
        assert!(SyncError::CredentialUnavailable {
            account_code: "store-a".into()
        }
        .is_config_absence());
        assert!(!SyncError::InvalidConfig("bad".into()).is_config_absence());
    }
}
