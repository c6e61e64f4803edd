//! # parceltrack-sync: Tracking Sync Engine for ParcelTrack
//!
//! This crate provides the tracking synchronization engine: batched fetch
//! from the carrier API, status normalization and transition detection,
//! idempotent persistence, and webhook notification of status changes.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sync Engine Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                SyncOrchestrator (Main Driver)                    │  │
//! │  │                                                                  │  │
//! │  │  One pass per lifecycle class, per-class run guards              │  │
//! │  │  Coordinates fetch → detect → persist → notify                   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ BatchFetcher   │  │ Persistence    │  │  WebhookDispatcher     │    │
//! │  │                │  │ Writer         │  │                        │    │
//! │  │ ≤50 waybills   │  │ One txn per    │  │ One batched POST per   │    │
//! │  │ per carrier    │  │ shipment:      │  │ pass, exponential      │    │
//! │  │ call, chunk    │  │ events + proj. │  │ backoff, app_config    │    │
//! │  │ failure walls  │  │ + returns      │  │ URL + retry ceiling    │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ CarrierApi     │  │ Credential     │  │  Config                │    │
//! │  │ (seam + HTTP)  │  │ Resolver       │  │  (TOML + env)          │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  Pure normalization/detection logic lives in parceltrack-core;          │
//! │  persistence lives in parceltrack-db. This crate only coordinates.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`orchestrator`] - `SyncOrchestrator`, run guards, `SyncRunReport`
//! - [`carrier`] - Carrier wire types, `CarrierApi` seam, HTTP client
//! - [`credentials`] - Per-store credential cache
//! - [`fetcher`] - Chunked batch fetch with failure containment
//! - [`writer`] - Transactional per-shipment commits
//! - [`webhook`] - Batched webhook delivery with retry/backoff
//! - [`validate`] - Post-sync consistency check
//! - [`config`] - Engine configuration (TOML + env)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parceltrack_core::LifecycleClass;
//! use parceltrack_db::{Database, DbConfig};
//! use parceltrack_sync::carrier::HttpCarrierClient;
//! use parceltrack_sync::webhook::HttpWebhookTransport;
//! use parceltrack_sync::{SyncConfig, SyncOrchestrator};
//!
//! let config = SyncConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(&config.database.path)).await?;
//!
//! let carrier = HttpCarrierClient::new(&config.carrier)?;
//! let transport = HttpWebhookTransport::new(&config.webhook)?;
//! let orchestrator = SyncOrchestrator::new(db, config, carrier, transport);
//!
//! let report = orchestrator.run(LifecycleClass::Active).await?;
//! println!("processed: {}", report.processed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod carrier;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod validate;
pub mod webhook;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use orchestrator::{SyncOrchestrator, SyncRunReport};
pub use webhook::{StatusChange, WebhookOutcome};
