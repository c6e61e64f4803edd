//! # parceltrack-db: Database Layer for ParcelTrack
//!
//! This crate provides database access for the ParcelTrack sync engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ParcelTrack Data Flow                              │
//! │                                                                         │
//! │  Sync Engine (parceltrack-sync)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  parceltrack-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌─────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (shipment.rs)  │    │ (embedded)  │  │   │
//! │  │   │               │    │                │    │             │  │   │
//! │  │   │ SqlitePool    │    │ ShipmentRepo   │    │ 001_initial │  │   │
//! │  │   │ Connection    │◄───│ EventRepo      │    │ _schema.sql │  │   │
//! │  │   │ Management    │    │ OrderRepo ...  │    │             │  │   │
//! │  │   └───────────────┘    └────────────────┘    └─────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (WAL)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (shipment, events, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parceltrack_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/parceltrack.db");
//! let db = Database::new(config).await?;
//!
//! let active = db
//!     .shipments()
//!     .fetch_population(LifecycleClass::Active)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::app_config::{
    AppConfigRepository, KEY_WEBHOOK_RETRY_COUNT, KEY_WEBHOOK_URL,
};
pub use repository::credential::CredentialRepository;
pub use repository::order::{OrderContact, OrderQuantities, OrderRepository};
pub use repository::return_warehouse::ReturnWarehouseRepository;
pub use repository::shipment::ShipmentRepository;
pub use repository::status_mapping::StatusMappingRepository;
pub use repository::tracking_event::TrackingEventRepository;
