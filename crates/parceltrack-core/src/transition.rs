//! # Transition Detection
//!
//! Given a shipment's previously persisted canonical status and a freshly
//! fetched, newly normalized event history, decide what actually changed.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transition Detection                               │
//! │                                                                         │
//! │  fetched history (any order)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  empty? ──► yes ──► None ("no update this cycle", NOT a regression)    │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  stable sort by event_time ascending                                    │
//! │       │                                                                 │
//! │       ├── new_status   = canonical status of the LAST event            │
//! │       ├── changed      = new_status != previous_status                  │
//! │       ├── lifecycle    = Inactive iff new_status == "Delivered"         │
//! │       └── handover_at  = time of the FIRST event that qualifies as     │
//! │                          handover — only if none recorded yet           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::status::StatusCatalog;
use crate::types::{LifecycleClass, NormalizedEvent};

/// Outcome of comparing fetched history against the persisted projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Canonical status of the chronologically last event.
    pub new_status: String,

    /// True when `new_status` differs from the previously persisted status.
    /// Carried through to webhook dispatch.
    pub status_changed: bool,

    /// Lifecycle class the shipment should move to.
    pub lifecycle: LifecycleClass,

    /// Candidate handover timestamp: the EARLIEST qualifying event.
    /// `Some` only when the shipment has no handover recorded yet and at
    /// least one event qualifies. The writer applies it first-write-wins.
    pub handover_at: Option<DateTime<Utc>>,
}

/// Detects the status transition for one shipment.
///
/// Returns `None` for an empty history: absence of tracking data means
/// "no update this cycle", never a regression to an unknown state.
///
/// The input slice may be in any order; detection sorts a copy internally
/// (stable, by event time) so callers don't have to care what order the
/// carrier returned activities in.
pub fn detect(
    previous_status: &str,
    handover_recorded: bool,
    events: &[NormalizedEvent],
    catalog: &StatusCatalog,
) -> Option<Transition> {
    if events.is_empty() {
        return None;
    }

    let mut ordered: Vec<&NormalizedEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.event_time);

    // Sort is stable and the slice is non-empty, so these are safe.
    let last = ordered[ordered.len() - 1];
    let new_status = last.status.clone();
    let status_changed = new_status != previous_status;
    let lifecycle = LifecycleClass::from_status(&new_status);

    let handover_at = if handover_recorded {
        None
    } else {
        ordered
            .iter()
            .find(|e| catalog.is_handover(&e.raw_status))
            .map(|e| e.event_time)
    };

    Some(Transition {
        new_status,
        status_changed,
        lifecycle,
        handover_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{STATUS_DELIVERED, STATUS_IN_TRANSIT, STATUS_SHIPMENT_BOOKED};
    use chrono::TimeZone;

    fn event(status: &str, raw: &str, day: u32) -> NormalizedEvent {
        NormalizedEvent {
            status: status.to_string(),
            raw_status: raw.to_string(),
            event_time: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            activity: None,
            location: None,
        }
    }

    #[test]
    fn test_empty_history_is_no_update() {
        let catalog = StatusCatalog::empty();
        assert_eq!(detect(STATUS_IN_TRANSIT, false, &[], &catalog), None);
    }

    #[test]
    fn test_new_status_is_chronologically_last() {
        let catalog = StatusCatalog::empty();
        // Passed in reverse order on purpose; the detector sorts.
        let events = vec![
            event(STATUS_DELIVERED, "Delivered", 15),
            event(STATUS_IN_TRANSIT, "In Transit", 10),
        ];
        let t = detect(STATUS_IN_TRANSIT, true, &events, &catalog).unwrap();
        assert_eq!(t.new_status, STATUS_DELIVERED);
        assert!(t.status_changed);
        assert_eq!(t.lifecycle, LifecycleClass::Inactive);
    }

    #[test]
    fn test_unchanged_status_reports_no_change() {
        let catalog = StatusCatalog::empty();
        let events = vec![event(STATUS_IN_TRANSIT, "In Transit", 10)];
        let t = detect(STATUS_IN_TRANSIT, true, &events, &catalog).unwrap();
        assert!(!t.status_changed);
        assert_eq!(t.lifecycle, LifecycleClass::Active);
    }

    #[test]
    fn test_handover_is_earliest_qualifying_event() {
        let catalog = StatusCatalog::empty();
        // Shuffled order; only the two custody events qualify.
        let events = vec![
            event(STATUS_DELIVERED, "Delivered", 15),
            event(STATUS_SHIPMENT_BOOKED, "Shipment Booked", 8),
            event(STATUS_IN_TRANSIT, "Picked Up", 10),
        ];
        let t = detect(STATUS_SHIPMENT_BOOKED, false, &events, &catalog).unwrap();
        assert_eq!(
            t.handover_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_recorded_handover_is_never_recomputed() {
        let catalog = StatusCatalog::empty();
        // An even earlier qualifying event shows up in a later fetch; it
        // must not produce a new candidate.
        let events = vec![
            event(STATUS_IN_TRANSIT, "Picked Up", 2),
            event(STATUS_DELIVERED, "Delivered", 15),
        ];
        let t = detect(STATUS_IN_TRANSIT, true, &events, &catalog).unwrap();
        assert_eq!(t.handover_at, None);
    }

    #[test]
    fn test_no_qualifying_event_yields_no_handover() {
        let catalog = StatusCatalog::empty();
        let events = vec![event(STATUS_SHIPMENT_BOOKED, "Shipment Booked", 8)];
        let t = detect("", false, &events, &catalog).unwrap();
        assert_eq!(t.handover_at, None);
    }

    #[test]
    fn test_detection_is_order_insensitive() {
        let catalog = StatusCatalog::empty();
        let a = vec![
            event(STATUS_IN_TRANSIT, "Picked Up", 10),
            event(STATUS_DELIVERED, "Delivered", 15),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            detect("", false, &a, &catalog),
            detect("", false, &b, &catalog)
        );
    }
}
