//! # parceltrack-core: Pure Business Logic for ParcelTrack
//!
//! This crate is the **heart** of ParcelTrack. It contains all tracking
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ParcelTrack Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 parceltrack-sync (Engine)                       │   │
//! │  │   carrier fetch ──► detect ──► persist ──► webhook              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ parceltrack-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  status   │  │ transition │  │  returns  │  │   │
//! │  │   │ Shipment  │  │ normalize │  │   detect   │  │  resolve  │  │   │
//! │  │   │  Events   │  │ handover? │  │ lifecycle  │  │ location  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 parceltrack-db (Database Layer)                 │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shipment, TrackingEvent, StatusMapping, ...)
//! - [`status`] - Status normalization: mapping catalog + rule fallback
//! - [`transition`] - Status-transition detection per shipment
//! - [`returns`] - Return-warehouse location resolution
//! - [`dates`] - Carrier date parsing and validity rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Total Normalization**: normalize() never fails, it falls back
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod error;
pub mod returns;
pub mod status;
pub mod transition;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use parceltrack_core::StatusCatalog` instead of
// `use parceltrack_core::status::StatusCatalog`

pub use error::{CoreError, CoreResult};
pub use returns::{resolve_return_location, ResolvedReturnLocation};
pub use status::StatusCatalog;
pub use transition::{detect, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum waybills per carrier tracking request.
///
/// ## Why a constant?
/// The carrier aggregation API caps batch tracking lookups; larger requests
/// are rejected wholesale. The batch fetcher chunks to this size.
pub const CARRIER_CHUNK_SIZE: usize = 50;
