//! # Status Normalization
//!
//! Maps raw carrier status strings to canonical statuses plus two derived
//! facts: "counts as handover" and "counts as return-to-origin".
//!
//! ## Lookup Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Normalization Pipeline                              │
//! │                                                                         │
//! │  raw carrier status ("IN_TRANSIT", "Pickup Not Done", ...)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Exact match in the mapping catalog (DB-backed, loaded by caller)    │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  2. Rule-based fallback: lowercase, trim, underscores → spaces,         │
//! │     then an ORDERED rule list, first match wins                         │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  3. Pass through unchanged (total function, never fails)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fallback is pure and total. Raw statuses that reach step 3 should be
//! flagged for a manual mapping-table entry; callers log them at `warn`.

use std::collections::HashMap;

use crate::types::{StatusMapping, *};

// =============================================================================
// Fallback Rules
// =============================================================================

/// How a fallback rule matches the normalized key.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// The whole key equals this phrase.
    Exact(&'static str),

    /// The key contains this phrase anywhere.
    Contains(&'static str),

    /// The key contains every one of these phrases.
    AllOf(&'static [&'static str]),
}

impl Pattern {
    fn matches(&self, key: &str) -> bool {
        match self {
            Pattern::Exact(p) => key == *p,
            Pattern::Contains(p) => key.contains(p),
            Pattern::AllOf(parts) => parts.iter().all(|p| key.contains(p)),
        }
    }
}

/// One (predicate, result) fallback rule.
struct FallbackRule {
    pattern: Pattern,
    canonical: &'static str,
}

const fn rule(pattern: Pattern, canonical: &'static str) -> FallbackRule {
    FallbackRule { pattern, canonical }
}

/// Ordered fallback rules, evaluated top to bottom, first match wins.
///
/// Ordering matters and is deliberate:
/// - exact phrases come first so specific carrier vocabulary ("rto in
///   transit", "out for pickup") is never swallowed by a broader
///   contains-rule further down;
/// - pickup-failure phrases precede plain pickup phrases;
/// - RTO phrases precede the generic transit/pickup rules so a status
///   containing both "rto" and "in transit" classifies as RTO.
static FALLBACK_RULES: &[FallbackRule] = &[
    // --- exact canonical vocabulary -----------------------------------------
    rule(Pattern::Exact("delivered"), STATUS_DELIVERED),
    rule(Pattern::Exact("in transit"), STATUS_IN_TRANSIT),
    rule(Pattern::Exact("intransit"), STATUS_IN_TRANSIT),
    rule(Pattern::Exact("out for delivery"), STATUS_OUT_FOR_DELIVERY),
    rule(Pattern::Exact("out for pickup"), STATUS_OUT_FOR_PICKUP),
    rule(Pattern::Exact("awb assigned"), STATUS_AWB_ASSIGNED),
    rule(Pattern::Exact("shipment booked"), STATUS_SHIPMENT_BOOKED),
    rule(Pattern::Exact("dispatched"), STATUS_DISPATCHED),
    rule(Pattern::Exact("cancelled"), STATUS_CANCELED),
    rule(Pattern::Exact("canceled"), STATUS_CANCELED),
    rule(Pattern::Exact("returned"), STATUS_RETURNED),
    rule(Pattern::Exact("undelivered"), STATUS_UNDELIVERED),
    rule(Pattern::Exact("lost"), STATUS_LOST),
    rule(Pattern::Exact("damaged"), STATUS_DAMAGED),
    rule(Pattern::Exact("delayed"), STATUS_DELAYED),
    rule(
        Pattern::Exact("reached destination hub"),
        STATUS_REACHED_DESTINATION,
    ),
    rule(Pattern::Exact("rto initiated"), STATUS_RTO_INITIATED),
    rule(Pattern::Exact("rto in transit"), STATUS_RTO_IN_TRANSIT),
    rule(Pattern::Exact("rto delivered"), STATUS_RTO_DELIVERED),
    rule(Pattern::Exact("return to origin"), STATUS_RTO_INITIATED),
    // --- pickup failures (before plain pickup) ------------------------------
    rule(Pattern::AllOf(&["pickup", "fail"]), STATUS_PICKUP_FAILED),
    rule(Pattern::AllOf(&["pickup", "not done"]), STATUS_PICKUP_FAILED),
    rule(Pattern::AllOf(&["pick up", "fail"]), STATUS_PICKUP_FAILED),
    // --- RTO variants (before transit/pickup) --------------------------------
    rule(Pattern::AllOf(&["rto", "delivered"]), STATUS_RTO_DELIVERED),
    rule(Pattern::AllOf(&["rto", "transit"]), STATUS_RTO_IN_TRANSIT),
    rule(Pattern::Contains("rto"), STATUS_RTO_INITIATED),
    // --- carrier custody movement --------------------------------------------
    rule(Pattern::Contains("picked up"), STATUS_IN_TRANSIT),
    rule(Pattern::Contains("pickup"), STATUS_IN_TRANSIT),
    rule(Pattern::Contains("in transit"), STATUS_IN_TRANSIT),
    rule(Pattern::Contains("out for delivery"), STATUS_OUT_FOR_DELIVERY),
    rule(Pattern::Contains("cancel"), STATUS_CANCELED),
];

/// Pre-pickup phrases that can never count as handover, checked before the
/// inclusive list so "pickup failed" is not misread as a pickup.
static HANDOVER_EXCLUDED: &[&str] = &[
    "awb assigned",
    "shipment booked",
    "pickup failed",
    "out for pickup",
];

/// Phrases that indicate the parcel is (or was) in carrier custody.
static HANDOVER_INCLUDED: &[&str] = &[
    "in transit",
    "delivered",
    "rto",
    "return",
    "cancel",
    "out for delivery",
    "picked up",
    "pickup",
    "dispatched",
    "undelivered",
    "reached destination",
];

/// Lowercase, trim, and collapse underscores to spaces.
fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', " ")
}

// =============================================================================
// Pure Fallback Functions
// =============================================================================

/// First fallback rule matching the normalized key, if any.
fn fallback_lookup(raw: &str) -> Option<&'static str> {
    let key = normalize_key(raw);
    FALLBACK_RULES
        .iter()
        .find(|r| r.pattern.matches(&key))
        .map(|r| r.canonical)
}

/// Rule-based fallback normalization. Total: returns the original string
/// (trimmed) when no rule matches.
pub fn fallback_normalize(raw: &str) -> String {
    match fallback_lookup(raw) {
        Some(canonical) => canonical.to_string(),
        None => raw.trim().to_string(),
    }
}

/// Rule-based fallback handover classification. Defaults to NOT handover.
pub fn fallback_is_handover(raw: &str) -> bool {
    let key = normalize_key(raw);

    if HANDOVER_EXCLUDED.iter().any(|p| key.contains(p)) {
        return false;
    }

    HANDOVER_INCLUDED.iter().any(|p| key.contains(p))
}

/// Rule-based fallback return-to-origin classification.
pub fn fallback_is_return(raw: &str) -> bool {
    let key = normalize_key(raw);
    key.contains("rto") || key.contains("return")
}

// =============================================================================
// Status Catalog
// =============================================================================

/// The mapping catalog plus the rule-based fallback, as one lookup surface.
///
/// The catalog half is loaded from the `status_mappings` table by the
/// caller (this crate does no I/O); the fallback half is compiled in.
#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    mappings: HashMap<String, StatusMapping>,
}

impl StatusCatalog {
    /// Builds a catalog from mapping-table rows.
    pub fn new(mappings: Vec<StatusMapping>) -> Self {
        StatusCatalog {
            mappings: mappings
                .into_iter()
                .map(|m| (m.raw_status.clone(), m))
                .collect(),
        }
    }

    /// An empty catalog: every lookup goes through the fallback rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True when the catalog holds no entries.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// True when `raw` resolves through the catalog, false when it falls
    /// back to the compiled rules. Callers use this to flag unmapped
    /// vocabulary for manual review.
    pub fn is_mapped(&self, raw: &str) -> bool {
        self.mappings.contains_key(raw)
    }

    /// True when either the catalog or a fallback rule recognizes `raw`.
    ///
    /// False means normalization was a pure passthrough. This is the
    /// signal for "flag for mapping review"; a string comparison of input
    /// and output cannot distinguish a passthrough from a rule that maps
    /// a canonical spelling to itself (raw "Delivered" is recognized, not
    /// unmapped).
    pub fn resolves(&self, raw: &str) -> bool {
        self.mappings.contains_key(raw) || fallback_lookup(raw).is_some()
    }

    /// Maps a raw carrier status to its canonical status.
    ///
    /// Total: catalog exact match, then fallback rules, then the original
    /// string unchanged. Never fails.
    pub fn normalize(&self, raw: &str) -> String {
        if let Some(m) = self.mappings.get(raw) {
            return m.renamed.clone();
        }
        fallback_normalize(raw)
    }

    /// Whether a raw carrier status counts as carrier handover.
    pub fn is_handover(&self, raw: &str) -> bool {
        if let Some(m) = self.mappings.get(raw) {
            return m.is_handover;
        }
        fallback_is_handover(raw)
    }

    /// Whether a raw carrier status indicates return-to-origin.
    pub fn is_return(&self, raw: &str) -> bool {
        if let Some(m) = self.mappings.get(raw) {
            return m.is_return;
        }
        fallback_is_return(raw)
    }
}
