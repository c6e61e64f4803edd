//! # Webhook Dispatcher
//!
//! Delivers one batched status-change notification per sync pass.
//!
//! ## Dispatch State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PREPARING ──► SENDING(attempt=k) ──► DELIVERED (2xx)                  │
//! │       │               │                                                 │
//! │       │               ├──► RETRYING ──sleep 2^(k-1)s──► SENDING(k+1)   │
//! │       │               │                                                 │
//! │       │               └──► EXHAUSTED (k == ceiling)                     │
//! │       │                                                                 │
//! │       └──► short-circuits: empty change set → success, sent = 0;        │
//! │            no URL configured → skip, zero network calls                 │
//! │                                                                         │
//! │   EXHAUSTED is reported in the run result, never fatal to the run.      │
//! │   The body is serialized once; every retry resends identical content.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Preparation does three bulk lookups (contacts, quantities, message
//! statuses) plus one bulk shipment fetch, joined by shipment key — never
//! one query per changed shipment.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::WebhookSettings;
use crate::error::{SyncError, SyncResult};
use parceltrack_core::ShipmentKey;
use parceltrack_db::{Database, KEY_WEBHOOK_RETRY_COUNT, KEY_WEBHOOK_URL};

/// Fixed User-Agent for outbound webhook requests.
const USER_AGENT: &str = "parceltrack-sync/0.1";

// =============================================================================
// Change Records
// =============================================================================

/// One status change accumulated during a sync pass.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub key: ShipmentKey,
    pub previous_status: String,
    pub new_status: String,
}

// =============================================================================
// Payload Shape
// =============================================================================

/// One order entry in the webhook body.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookOrder {
    pub order_id: String,
    pub account_code: String,
    pub carrier_id: Option<String>,
    pub awb: String,
    pub current_shipment_status: String,
    pub previous_status: String,
    pub shipping_phone: Option<String>,
    pub shipping_firstname: Option<String>,
    pub shipping_lastname: Option<String>,
    pub number_of_product: i64,
    pub number_of_quantity: i64,
    pub latest_message_status: Option<String>,
}

/// The full webhook body.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub timestamp: chrono::DateTime<Utc>,
    pub event: &'static str,
    pub orders: Vec<WebhookOrder>,
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of one dispatch cycle, carried into the run report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookOutcome {
    /// True on any 2xx response, and for the empty/skip short-circuits.
    pub delivered: bool,

    /// Orders included in the delivered payload (0 when nothing to send).
    pub sent: usize,

    /// Attempts actually made (0 when short-circuited).
    pub attempts: u32,

    /// Set when delivery was skipped (e.g. no URL configured).
    pub skipped: Option<String>,

    /// Last error text when exhausted.
    pub last_error: Option<String>,
}

// =============================================================================
// Transport Seam
// =============================================================================

/// Seam over the HTTP POST so retry behavior is testable without sockets.
pub trait WebhookTransport: Send + Sync {
    /// Posts the body to the URL, returning the HTTP status code. `Err`
    /// covers timeouts and connection failures.
    fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl std::future::Future<Output = SyncResult<u16>> + Send;
}

/// Production transport over reqwest.
#[derive(Debug, Clone)]
pub struct HttpWebhookTransport {
    client: reqwest::Client,
}

impl HttpWebhookTransport {
    /// Builds a transport with the per-attempt timeout from settings.
    pub fn new(settings: &WebhookSettings) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SyncError::Internal(e.to_string()))?;
        Ok(HttpWebhookTransport { client })
    }
}

impl WebhookTransport for HttpWebhookTransport {
    async fn post(&self, url: &str, body: &serde_json::Value) -> SyncResult<u16> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::WebhookDeliveryFailed {
                attempts: 1,
                last_error: e.to_string(),
            })?;
        Ok(response.status().as_u16())
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Prepares and delivers the batched status-change notification.
pub struct WebhookDispatcher<T> {
    transport: T,
    db: Database,
    default_retry_count: u32,
}

impl<T: WebhookTransport> WebhookDispatcher<T> {
    /// Creates a dispatcher over the given transport and database.
    pub fn new(transport: T, db: Database, default_retry_count: u32) -> Self {
        WebhookDispatcher {
            transport,
            db,
            default_retry_count,
        }
    }

    /// Runs one dispatch cycle for the changes of one sync pass.
    ///
    /// Only a database failure during preparation is an `Err`; delivery
    /// failure after exhausted retries comes back as a non-delivered
    /// outcome, because webhook trouble must never fail the sync pass.
    #[instrument(skip_all, fields(changes = changes.len()))]
    pub async fn dispatch(&self, changes: &[StatusChange]) -> SyncResult<WebhookOutcome> {
        if changes.is_empty() {
            debug!("No status changes, webhook dispatch short-circuits");
            return Ok(WebhookOutcome {
                delivered: true,
                ..WebhookOutcome::default()
            });
        }

        let Some(url) = self.db.app_config().get(KEY_WEBHOOK_URL).await? else {
            info!("No webhook URL configured, skipping delivery");
            return Ok(WebhookOutcome {
                delivered: true,
                skipped: Some("no webhook URL configured".to_string()),
                ..WebhookOutcome::default()
            });
        };

        let max_attempts = self
            .db
            .app_config()
            .get_u32(KEY_WEBHOOK_RETRY_COUNT)
            .await?
            .unwrap_or(self.default_retry_count)
            .max(1);

        let payload = self.prepare(changes).await?;
        let sent = payload.orders.len();
        // Serialized once: retries resend byte-identical content.
        let body = serde_json::to_value(&payload)?;

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "Sending webhook");

            match self.transport.post(&url, &body).await {
                Ok(status) if (200..300).contains(&status) => {
                    info!(attempt, sent, status, "Webhook delivered");
                    return Ok(WebhookOutcome {
                        delivered: true,
                        sent,
                        attempts: attempt,
                        ..WebhookOutcome::default()
                    });
                }
                Ok(status) => {
                    last_error = format!("endpoint returned {status}");
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < max_attempts {
                let backoff = Duration::from_secs(1 << (attempt - 1));
                warn!(attempt, ?backoff, error = %last_error, "Webhook attempt failed, retrying");
                tokio::time::sleep(backoff).await;
            }
        }

        warn!(
            attempts = max_attempts,
            error = %last_error,
            "Webhook delivery exhausted"
        );
        Ok(WebhookOutcome {
            delivered: false,
            sent,
            attempts: max_attempts,
            skipped: None,
            last_error: Some(last_error),
        })
    }

    /// Joins the bulk lookups into one payload entry per changed shipment.
    /// Order follows the input change list, so retries within one cycle
    /// are stable.
    async fn prepare(&self, changes: &[StatusChange]) -> SyncResult<WebhookPayload> {
        let keys: Vec<ShipmentKey> = changes.iter().map(|c| c.key.clone()).collect();

        let shipments: HashMap<ShipmentKey, _> = self
            .db
            .shipments()
            .get_by_keys(&keys)
            .await?
            .into_iter()
            .map(|s| (s.key(), s))
            .collect();
        let contacts = self.db.orders().contacts(&keys).await?;
        let quantities = self.db.orders().quantities(&keys).await?;
        let messages = self.db.orders().latest_message_statuses(&keys).await?;

        let orders = changes
            .iter()
            .map(|change| {
                let shipment = shipments.get(&change.key);
                let contact = contacts.get(&change.key);
                let quantity = quantities.get(&change.key);

                WebhookOrder {
                    order_id: change.key.order_id.clone(),
                    account_code: change.key.account_code.clone(),
                    carrier_id: shipment.and_then(|s| s.carrier_id.clone()),
                    awb: shipment.map(|s| s.awb.clone()).unwrap_or_default(),
                    current_shipment_status: change.new_status.clone(),
                    previous_status: change.previous_status.clone(),
                    shipping_phone: contact.and_then(|c| c.shipping_phone.clone()),
                    shipping_firstname: contact.and_then(|c| c.shipping_firstname.clone()),
                    shipping_lastname: contact.and_then(|c| c.shipping_lastname.clone()),
                    number_of_product: quantity.map(|q| q.number_of_product).unwrap_or(0),
                    number_of_quantity: quantity.map(|q| q.number_of_quantity).unwrap_or(0),
                    latest_message_status: messages.get(&change.key).cloned(),
                }
            })
            .collect();

        Ok(WebhookPayload {
            timestamp: Utc::now(),
            event: "status_update",
            orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parceltrack_db::repository::shipment::new_shipment;
    use parceltrack_db::DbConfig;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Fake transport: scripted status codes, records every posted body.
    #[derive(Clone)]
    struct FakeTransport {
        responses: Arc<Mutex<Vec<SyncResult<u16>>>>,
        posts: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl FakeTransport {
        fn returning(codes: Vec<SyncResult<u16>>) -> Self {
            FakeTransport {
                responses: Arc::new(Mutex::new(codes)),
                posts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl WebhookTransport for FakeTransport {
        async fn post(&self, _url: &str, body: &serde_json::Value) -> SyncResult<u16> {
            self.posts.lock().await.push(body.clone());
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                Ok(500)
            } else {
                responses.remove(0)
            }
        }
    }

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut shipment = new_shipment("ORD-1", "store-a", "AWB-1");
        shipment.carrier_id = Some("carrier-7".to_string());
        db.shipments().insert(&shipment).await.unwrap();

        sqlx::query(
            "INSERT INTO orders (order_id, account_code, shipping_phone, shipping_firstname, shipping_lastname) \
             VALUES ('ORD-1', 'store-a', '555-0101', 'Ada', 'Lovelace')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO order_items (id, order_id, account_code, product_sku, quantity) \
             VALUES ('i1', 'ORD-1', 'store-a', 'SKU-A', 3)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        db
    }

    fn one_change() -> Vec<StatusChange> {
        vec![StatusChange {
            key: ShipmentKey::new("ORD-1", "store-a"),
            previous_status: "In Transit".to_string(),
            new_status: "Delivered".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_empty_change_set_makes_no_calls() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let transport = FakeTransport::returning(vec![]);
        let dispatcher = WebhookDispatcher::new(transport.clone(), db, 3);

        let outcome = dispatcher.dispatch(&[]).await.unwrap();
        assert!(outcome.delivered);
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.attempts, 0);
        assert!(transport.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_url_skips_delivery() {
        let db = seeded_db().await;
        let transport = FakeTransport::returning(vec![Ok(200)]);
        let dispatcher = WebhookDispatcher::new(transport.clone(), db, 3);

        let outcome = dispatcher.dispatch(&one_change()).await.unwrap();
        assert!(outcome.delivered);
        assert!(outcome.skipped.is_some());
        assert!(transport.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_payload_shape_and_enrichment() {
        let db = seeded_db().await;
        db.app_config()
            .set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();
        let transport = FakeTransport::returning(vec![Ok(200)]);
        let dispatcher = WebhookDispatcher::new(transport.clone(), db, 3);

        let outcome = dispatcher.dispatch(&one_change()).await.unwrap();
        assert!(outcome.delivered);
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.attempts, 1);

        let posts = transport.posts.lock().await;
        let body = &posts[0];
        assert_eq!(body["event"], "status_update");
        let order = &body["orders"][0];
        assert_eq!(order["order_id"], "ORD-1");
        assert_eq!(order["awb"], "AWB-1");
        assert_eq!(order["carrier_id"], "carrier-7");
        assert_eq!(order["current_shipment_status"], "Delivered");
        assert_eq!(order["previous_status"], "In Transit");
        assert_eq!(order["shipping_firstname"], "Ada");
        assert_eq!(order["number_of_product"], 1);
        assert_eq!(order["number_of_quantity"], 3);
    }

    #[tokio::test]
    async fn test_persistent_500_exhausts_with_backoff() {
        let db = seeded_db().await;
        db.app_config()
            .set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();
        let transport = FakeTransport::returning(vec![Ok(500), Ok(500), Ok(500)]);
        let dispatcher = WebhookDispatcher::new(transport.clone(), db, 3);

        let started = tokio::time::Instant::now();
        let outcome = dispatcher.dispatch(&one_change()).await.unwrap();
        let elapsed = started.elapsed();

        assert!(!outcome.delivered);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last_error.as_deref(), Some("endpoint returned 500"));
        // Backoff 1s after attempt 1, 2s after attempt 2, none after the last.
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));

        // Retries resend identical content.
        let posts = transport.posts.lock().await;
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0], posts[1]);
        assert_eq!(posts[1], posts[2]);
    }

    #[tokio::test]
    async fn test_second_attempt_success() {
        let db = seeded_db().await;
        db.app_config()
            .set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();
        let transport = FakeTransport::returning(vec![
            Err(SyncError::WebhookDeliveryFailed {
                attempts: 1,
                last_error: "timeout".into(),
            }),
            Ok(204),
        ]);
        let dispatcher = WebhookDispatcher::new(transport, db, 3);

        let outcome = dispatcher.dispatch(&one_change()).await.unwrap();
        assert!(outcome.delivered);
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn test_retry_count_override_from_app_config() {
        let db = seeded_db().await;
        db.app_config()
            .set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();
        db.app_config()
            .set(KEY_WEBHOOK_RETRY_COUNT, "1")
            .await
            .unwrap();
        let transport = FakeTransport::returning(vec![Ok(500)]);
        let dispatcher = WebhookDispatcher::new(transport.clone(), db, 3);

        let outcome = dispatcher.dispatch(&one_change()).await.unwrap();
        assert!(!outcome.delivered);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(transport.posts.lock().await.len(), 1);
    }
}
