//! # Return-Warehouse Resolution
//!
//! For shipments in a return-to-origin branch, resolve WHERE the parcel is
//! being returned to and WHEN that was last observed.
//!
//! The rule (explicit and named, no reliance on array order from the
//! carrier): drop activities with invalid dates, stable-sort descending by
//! date, first element wins. If no activity survives the filter, fall back
//! to the carrier-declared delivery location. If that is missing too, the
//! caller leaves the stored record unchanged.

use chrono::{DateTime, Utc};

use crate::dates::parse_valid_carrier_date;
use crate::types::{RawActivity, ReturnLocationSource};

/// A resolved return disposition: location text, the timestamp of the
/// observation, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReturnLocation {
    pub location: String,
    pub observed_at: DateTime<Utc>,
    pub source: ReturnLocationSource,
}

/// Resolves the return-warehouse location from carrier activities.
///
/// An activity is invalid when its timestamp is missing, empty,
/// unparseable, or an epoch-equivalent placeholder. Ties on the same
/// timestamp keep the carrier's original order (stable sort), so the first
/// listed of two same-dated activities wins.
///
/// `delivered_to` is the carrier-declared delivery location used as a
/// fallback when no activity has a valid date; its `observed_at` is the
/// current time since the carrier gives none, and its source marks it as
/// a fallback so a later activity-sourced observation always replaces it.
pub fn resolve_return_location(
    activities: &[RawActivity],
    delivered_to: Option<&str>,
    now: DateTime<Utc>,
) -> Option<ResolvedReturnLocation> {
    let mut dated: Vec<(DateTime<Utc>, &RawActivity)> = activities
        .iter()
        .filter(|a| !a.location.trim().is_empty())
        .filter_map(|a| parse_valid_carrier_date(&a.date).map(|d| (d, a)))
        .collect();

    // Stable: same-dated activities keep carrier order, earliest listed wins.
    dated.sort_by_key(|(d, _)| std::cmp::Reverse(*d));

    if let Some((observed_at, activity)) = dated.first() {
        return Some(ResolvedReturnLocation {
            location: activity.location.trim().to_string(),
            observed_at: *observed_at,
            source: ReturnLocationSource::Activity,
        });
    }

    match delivered_to {
        Some(loc) if !loc.trim().is_empty() => Some(ResolvedReturnLocation {
            location: loc.trim().to_string(),
            observed_at: now,
            source: ReturnLocationSource::CarrierDeclared,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(date: &str, location: &str) -> RawActivity {
        RawActivity {
            date: date.to_string(),
            activity: String::new(),
            location: location.to_string(),
        }
    }

    #[test]
    fn test_latest_valid_date_wins() {
        // "B" has the latest valid date; "C" is listed later but undated.
        let activities = vec![
            activity("2026-01-10", "A"),
            activity("2026-01-12", "B"),
            activity("", "C"),
        ];
        let resolved = resolve_return_location(&activities, None, Utc::now()).unwrap();
        assert_eq!(resolved.location, "B");
        assert_eq!(resolved.source, ReturnLocationSource::Activity);
    }

    #[test]
    fn test_epoch_placeholder_is_invalid() {
        let activities = vec![
            activity("1970-01-01 00:00:00", "Bogus"),
            activity("2026-01-05", "Real"),
        ];
        let resolved = resolve_return_location(&activities, None, Utc::now()).unwrap();
        assert_eq!(resolved.location, "Real");
    }

    #[test]
    fn test_tie_keeps_carrier_order() {
        let activities = vec![
            activity("2026-01-10", "First"),
            activity("2026-01-10", "Second"),
        ];
        let resolved = resolve_return_location(&activities, None, Utc::now()).unwrap();
        assert_eq!(resolved.location, "First");
    }

    #[test]
    fn test_fallback_to_delivered_to() {
        let activities = vec![activity("", "NoDate")];
        let now = Utc::now();
        let resolved = resolve_return_location(&activities, Some("Main Warehouse"), now).unwrap();
        assert_eq!(resolved.location, "Main Warehouse");
        assert_eq!(resolved.observed_at, now);
        // Wall-clock stamped, so it must be marked as a fallback.
        assert_eq!(resolved.source, ReturnLocationSource::CarrierDeclared);
    }

    #[test]
    fn test_nothing_resolvable_leaves_record_unchanged() {
        let activities = vec![activity("", "NoDate")];
        assert_eq!(resolve_return_location(&activities, None, Utc::now()), None);
        assert_eq!(
            resolve_return_location(&activities, Some("   "), Utc::now()),
            None
        );
        assert_eq!(resolve_return_location(&[], None, Utc::now()), None);
    }

    #[test]
    fn test_blank_location_is_skipped() {
        let activities = vec![
            activity("2026-01-12", "  "),
            activity("2026-01-10", "Depot"),
        ];
        let resolved = resolve_return_location(&activities, None, Utc::now()).unwrap();
        assert_eq!(resolved.location, "Depot");
    }
}
