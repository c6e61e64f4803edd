//! # Domain Types
//!
//! Core domain types for shipment tracking.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tracking Domain Model                             │
//! │                                                                         │
//! │  Shipment ──────────────── identified by ShipmentKey                    │
//! │     │                      (order_id, account_code)                     │
//! │     │                                                                   │
//! │     ├── current_status     Denormalized projection of the most         │
//! │     ├── lifecycle          recent valid TrackingEvent                  │
//! │     ├── is_handover        Set once, first qualifying event wins       │
//! │     └── handover_at                                                     │
//! │     │                                                                   │
//! │     ├──► TrackingEvent *   Append-only history. Duplicate key:         │
//! │     │                      (shipment key, status, event_time)          │
//! │     │                                                                   │
//! │     └──► ReturnWarehouseRecord ?                                        │
//! │                            One per shipment, upserted from the         │
//! │                            most recent VALID carrier activity          │
//! │                                                                         │
//! │  StatusMapping             raw carrier text → canonical status         │
//! │                            (+ handover / return flags)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Canonical Status Constants
// =============================================================================
// All business logic compares against these strings, never raw carrier text.

/// Parcel is in carrier custody and moving toward the customer.
pub const STATUS_IN_TRANSIT: &str = "In Transit";
/// Parcel was delivered to the customer. Terminal for the forward lifecycle.
pub const STATUS_DELIVERED: &str = "Delivered";
/// Carrier attempted pickup and failed. Pre-handover.
pub const STATUS_PICKUP_FAILED: &str = "Pickup Failed";
/// Parcel is out with the last-mile rider.
pub const STATUS_OUT_FOR_DELIVERY: &str = "Out For Delivery";
/// Rider is on the way to collect the parcel. Pre-handover.
pub const STATUS_OUT_FOR_PICKUP: &str = "Out For Pickup";
/// Return-to-origin has been opened by the carrier.
pub const STATUS_RTO_INITIATED: &str = "RTO Initiated";
/// Return parcel is moving back toward the seller.
pub const STATUS_RTO_IN_TRANSIT: &str = "RTO In Transit";
/// Return parcel arrived back at the seller warehouse.
pub const STATUS_RTO_DELIVERED: &str = "RTO Delivered";
/// Shipment was cancelled before completion.
pub const STATUS_CANCELED: &str = "Canceled";
/// Parcel was returned (customer-side return flow).
pub const STATUS_RETURNED: &str = "Returned";
/// Parcel left the origin facility.
pub const STATUS_DISPATCHED: &str = "Dispatched";
/// Booking exists with the carrier, nothing has moved yet. Pre-handover.
pub const STATUS_SHIPMENT_BOOKED: &str = "Shipment Booked";
/// A waybill number was assigned. Pre-handover.
pub const STATUS_AWB_ASSIGNED: &str = "AWB Assigned";
/// Delivery attempt failed.
pub const STATUS_UNDELIVERED: &str = "Undelivered";
/// Carrier declared the parcel lost.
pub const STATUS_LOST: &str = "Lost";
/// Carrier declared the parcel damaged.
pub const STATUS_DAMAGED: &str = "Damaged";
/// Carrier flagged a delay.
pub const STATUS_DELAYED: &str = "Delayed";
/// Parcel reached the destination city hub.
pub const STATUS_REACHED_DESTINATION: &str = "Reached Destination Hub";

// =============================================================================
// Lifecycle Class
// =============================================================================

/// Coarse partition of shipments used to select sync populations.
///
/// A shipment is `Inactive` only once its canonical status is exactly
/// "Delivered"; everything else (including RTO branches) stays `Active`
/// so the inactive pass can still catch late RTO movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LifecycleClass {
    /// Shipment is still in motion; synced on the frequent schedule.
    #[default]
    Active,

    /// Shipment is delivered; synced on the slow schedule.
    Inactive,
}

impl LifecycleClass {
    /// Derives the lifecycle class from a canonical status.
    pub fn from_status(canonical_status: &str) -> Self {
        if canonical_status == STATUS_DELIVERED {
            LifecycleClass::Inactive
        } else {
            LifecycleClass::Active
        }
    }
}

impl std::fmt::Display for LifecycleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleClass::Active => write!(f, "active"),
            LifecycleClass::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for LifecycleClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LifecycleClass::Active),
            "inactive" => Ok(LifecycleClass::Inactive),
            other => Err(CoreError::InvalidLifecycle(other.to_string())),
        }
    }
}

// =============================================================================
// Shipment Key
// =============================================================================

/// Composite identity of a shipment: the order it fulfils plus the store
/// (account) it belongs to. Waybills are carrier-scoped and can repeat
/// across stores, so they are NOT part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentKey {
    /// Order identifier within the owning store.
    pub order_id: String,

    /// Owning store identifier.
    pub account_code: String,
}

impl ShipmentKey {
    pub fn new(order_id: impl Into<String>, account_code: impl Into<String>) -> Self {
        ShipmentKey {
            order_id: order_id.into(),
            account_code: account_code.into(),
        }
    }
}

impl std::fmt::Display for ShipmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account_code, self.order_id)
    }
}

// =============================================================================
// Shipment
// =============================================================================

/// One outbound or return parcel.
///
/// Mutated only by the persistence writer; never deleted by the sync
/// subsystem. `current_status` is a denormalized projection of the most
/// recent valid tracking event and must not diverge from the event history
/// after a successful sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shipment {
    /// Surrogate row id (UUID v4).
    pub id: String,

    /// Order identifier (half of the shipment key).
    pub order_id: String,

    /// Owning store identifier (other half of the shipment key).
    pub account_code: String,

    /// Carrier-assigned waybill number.
    pub awb: String,

    /// Carrier identifier for this shipment (used in webhook payloads).
    pub carrier_id: Option<String>,

    /// Current canonical status (denormalized projection).
    pub current_status: String,

    /// Lifecycle class derived from the canonical status.
    pub lifecycle: LifecycleClass,

    /// Whether the parcel has been handed over to the carrier.
    pub is_handover: bool,

    /// Timestamp of the FIRST event that qualified as handover.
    /// Set exactly once; later syncs never move it.
    pub handover_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Returns the composite shipment key.
    pub fn key(&self) -> ShipmentKey {
        ShipmentKey::new(self.order_id.clone(), self.account_code.clone())
    }
}

// =============================================================================
// Tracking Events
// =============================================================================

/// An immutable historical tracking fact, as persisted.
///
/// Append-only. An event is a duplicate if (shipment key, status,
/// event_time) already exists; duplicates are never re-inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TrackingEvent {
    /// Surrogate row id (UUID v4).
    pub id: String,

    pub order_id: String,
    pub account_code: String,

    /// Canonical status of this event.
    pub status: String,

    /// When the carrier says this happened.
    pub event_time: DateTime<Utc>,

    /// Raw carrier activity text, kept verbatim for audit.
    pub activity: Option<String>,

    /// Raw carrier location text.
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A freshly fetched carrier activity after normalization, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Canonical status derived from `raw_status`.
    pub status: String,

    /// The raw carrier status string this event carried.
    pub raw_status: String,

    /// When the carrier says this happened.
    pub event_time: DateTime<Utc>,

    /// Free-text activity description from the carrier.
    pub activity: Option<String>,

    /// Location text from the carrier.
    pub location: Option<String>,
}

/// A raw carrier activity line before normalization.
///
/// The `date` field stays a string here on purpose: carriers emit empty
/// strings and epoch placeholders, and validity filtering is a business
/// rule (see [`crate::returns`]), not a parsing concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    /// Activity timestamp as sent by the carrier. May be empty or junk.
    #[serde(default)]
    pub date: String,

    /// Free-text activity description.
    #[serde(default)]
    pub activity: String,

    /// Location text.
    #[serde(default)]
    pub location: String,
}

// =============================================================================
// Status Mapping
// =============================================================================

/// One lookup-table entry: raw carrier status → canonical status + flags.
///
/// Read-only from the sync engine's perspective; an external collaborator
/// owns writes to this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StatusMapping {
    /// Raw carrier status text (exact match key).
    pub raw_status: String,

    /// Canonical status this raw text maps to.
    pub renamed: String,

    /// Whether this status counts as carrier handover.
    pub is_handover: bool,

    /// Whether this status indicates return-to-origin.
    pub is_return: bool,
}

// =============================================================================
// Return Warehouse Record
// =============================================================================

/// Where a return-warehouse observation came from.
///
/// Activity-sourced observations carry the carrier's own timestamp;
/// carrier-declared ones are a dateless fallback stamped with the wall
/// clock, so they must never block a later activity-sourced write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnLocationSource {
    /// Resolved from a dated tracking activity.
    Activity,

    /// Fallback to the carrier-declared delivery location (no date given).
    CarrierDeclared,
}

/// Final disposition location of a returning parcel.
///
/// One record per shipment, upserted. The stored location always reflects
/// the most recently observed VALID activity; a write based on older data
/// never replaces newer data, and a carrier-declared fallback never
/// replaces an activity-sourced observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnWarehouseRecord {
    pub order_id: String,
    pub account_code: String,

    /// Resolved warehouse/location text.
    pub location: String,

    /// Timestamp of the activity that produced this location.
    pub observed_at: DateTime<Utc>,

    /// Provenance of the current observation.
    pub source: ReturnLocationSource,

    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Store Credential
// =============================================================================

/// Carrier-API credential for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoreCredential {
    /// Store this credential belongs to.
    pub account_code: String,

    /// Credential status ("active" enables fetching).
    pub status: String,

    /// Token sent in the carrier API Authorization header.
    pub auth_token: String,
}

impl StoreCredential {
    /// Returns true if this credential may be used for carrier calls.
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}
