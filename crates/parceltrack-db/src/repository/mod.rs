//! # Repository Module
//!
//! Database repository implementations for ParcelTrack.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Sync Engine                                                           │
//! │       │                                                                 │
//! │       │  db.shipments().fetch_population(LifecycleClass::Active)       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ShipmentRepository                                                    │
//! │  ├── fetch_population(&self, lifecycle)                                │
//! │  ├── update_projection(conn, key, status, lifecycle)                   │
//! │  └── record_handover(conn, key, handover_at)                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Pool-based methods serve reads; methods taking &mut SqliteConnection  │
//! │  compose into one per-shipment transaction in the persistence writer.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ShipmentRepository`] - Shipment projection reads and writes
//! - [`TrackingEventRepository`] - Idempotent tracking-event appends
//! - [`StatusMappingRepository`] - Raw-status → canonical mapping table
//! - [`ReturnWarehouseRepository`] - Return-disposition upserts
//! - [`CredentialRepository`] - Per-store carrier credentials
//! - [`AppConfigRepository`] - Mutable key-value config (webhook URL etc.)
//! - [`OrderRepository`] - Bulk order/customer lookups for payloads

pub mod app_config;
pub mod credential;
pub mod order;
pub mod return_warehouse;
pub mod shipment;
pub mod status_mapping;
pub mod tracking_event;

pub use app_config::AppConfigRepository;
pub use credential::CredentialRepository;
pub use order::OrderRepository;
pub use return_warehouse::ReturnWarehouseRepository;
pub use shipment::ShipmentRepository;
pub use status_mapping::StatusMappingRepository;
pub use tracking_event::TrackingEventRepository;
