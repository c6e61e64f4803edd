//! # Carrier Tracking Client
//!
//! Wire types and HTTP client for the carrier-aggregation tracking API.
//!
//! ## Wire Shape
//! ```text
//! GET <base>?awb_numbers=<csv>&tracking_history=1
//! Authorization: <store credential>
//!
//! → [ { "awb": "...",
//!       "tracking_details": {
//!           "shipment_status": "...",
//!           "shipment_details": [ { "delivered_to": "..." } ],
//!           "shipment_track_activities": [
//!               { "date": "...", "activity": "...", "location": "..." } ] } } ]
//! ```
//!
//! Absence of an entry for a requested waybill is not an error; the carrier
//! simply has nothing for it this cycle.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::CarrierSettings;
use crate::error::{SyncError, SyncResult};
use parceltrack_core::RawActivity;

// =============================================================================
// Wire Types
// =============================================================================

/// One tracking result, keyed by waybill.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingResult {
    pub awb: String,
    #[serde(default)]
    pub tracking_details: Option<TrackingDetails>,
}

/// Tracking payload for one shipment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingDetails {
    /// Carrier's own headline status for the shipment.
    #[serde(default)]
    pub shipment_status: Option<String>,

    /// Carrier-declared shipment facts (delivered-to location etc.).
    #[serde(default)]
    pub shipment_details: Vec<ShipmentDetail>,

    /// Full activity history, carrier order (not trusted; sorted downstream).
    #[serde(default)]
    pub shipment_track_activities: Vec<RawActivity>,
}

/// One entry of `shipment_details`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentDetail {
    /// Where the carrier says the parcel ended up. Fallback source for
    /// return-warehouse resolution when no activity has a valid date.
    #[serde(default)]
    pub delivered_to: Option<String>,
}

impl TrackingDetails {
    /// First non-empty carrier-declared delivered-to location, if any.
    pub fn delivered_to(&self) -> Option<&str> {
        self.shipment_details
            .iter()
            .filter_map(|d| d.delivered_to.as_deref())
            .find(|loc| !loc.trim().is_empty())
    }
}

// =============================================================================
// Carrier API Seam
// =============================================================================

/// Seam over the carrier tracking call so the fetcher and orchestrator can
/// be exercised against an in-test fake.
pub trait CarrierApi: Send + Sync {
    /// Fetches tracking history for up to one chunk of waybills.
    fn fetch_chunk(
        &self,
        auth_token: &str,
        waybills: &[String],
    ) -> impl std::future::Future<Output = SyncResult<Vec<TrackingResult>>> + Send;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Production carrier client over reqwest.
#[derive(Debug, Clone)]
pub struct HttpCarrierClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCarrierClient {
    /// Builds a client with the batch timeout from settings.
    pub fn new(settings: &CarrierSettings) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.batch_timeout_secs))
            .build()?;

        Ok(HttpCarrierClient {
            client,
            base_url: settings.base_url.clone(),
        })
    }
}

impl CarrierApi for HttpCarrierClient {
    #[instrument(skip(self, auth_token, waybills), fields(count = waybills.len()))]
    async fn fetch_chunk(
        &self,
        auth_token: &str,
        waybills: &[String],
    ) -> SyncResult<Vec<TrackingResult>> {
        let csv = waybills.join(",");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("awb_numbers", csv.as_str()), ("tracking_history", "1")])
            .header(reqwest::header::AUTHORIZATION, auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::CarrierRequestFailed(format!(
                "carrier returned {status}"
            )));
        }

        let results: Vec<TrackingResult> = response.json().await?;
        debug!(returned = results.len(), "Carrier chunk fetched");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_parse_full_payload() {
        let body = r#"[
            {
                "awb": "123456789",
                "tracking_details": {
                    "shipment_status": "Delivered to Consignee",
                    "shipment_details": [{"delivered_to": "Karachi Warehouse"}],
                    "shipment_track_activities": [
                        {"date": "2026-01-10 14:30:00", "activity": "Picked Up", "location": "Lahore"},
                        {"date": "2026-01-12 09:15:00", "activity": "Delivered", "location": "Karachi"}
                    ]
                }
            }
        ]"#;

        let results: Vec<TrackingResult> = serde_json::from_str(body).unwrap();
        assert_eq!(results.len(), 1);
        let details = results[0].tracking_details.as_ref().unwrap();
        assert_eq!(details.shipment_status.as_deref(), Some("Delivered to Consignee"));
        assert_eq!(details.shipment_track_activities.len(), 2);
        assert_eq!(details.delivered_to(), Some("Karachi Warehouse"));
    }

    #[test]
    fn test_wire_parse_tolerates_missing_fields() {
        let body = r#"[{"awb": "999"}, {"awb": "888", "tracking_details": {}}]"#;
        let results: Vec<TrackingResult> = serde_json::from_str(body).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].tracking_details.is_none());
        let empty = results[1].tracking_details.as_ref().unwrap();
        assert!(empty.shipment_track_activities.is_empty());
        assert_eq!(empty.delivered_to(), None);
    }

    #[test]
    fn test_delivered_to_skips_blank_entries() {
        let details = TrackingDetails {
            shipment_status: None,
            shipment_details: vec![
                ShipmentDetail { delivered_to: Some("  ".into()) },
                ShipmentDetail { delivered_to: Some("Hub B".into()) },
            ],
            shipment_track_activities: vec![],
        };
        assert_eq!(details.delivered_to(), Some("Hub B"));
    }
}
