//! # Sync Orchestrator
//!
//! Top-level driver for one tracking sync pass.
//!
//! ## Run Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Sync Pass                                   │
//! │                                                                         │
//! │  acquire per-lifecycle guard (reject immediately if held)               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  load status catalog ──► fetch population (lifecycle-partitioned)       │
//! │      │                                                                  │
//! │      ▼   per store (sequential, inter-store delay)                      │
//! │  resolve credential ──► chunk fetch ──► per shipment (concurrent,       │
//! │                                         bounded by chunk size):         │
//! │                                         normalize + detect + commit     │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  webhook dispatch (one batch) ──► post-sync validation (informational)  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  release guard, return SyncRunReport                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The active-sync and inactive-sync guards are independent: the two
//! lifecycle classes may run concurrently with each other, never with
//! themselves. Population queries are partitioned by lifecycle, so the two
//! passes cannot see the same shipment in one cycle.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::carrier::{CarrierApi, TrackingDetails};
use crate::config::SyncConfig;
use crate::credentials::CredentialResolver;
use crate::error::{SyncError, SyncResult};
use crate::fetcher::BatchFetcher;
use crate::validate::{post_sync_validation, ValidationReport};
use crate::webhook::{StatusChange, WebhookDispatcher, WebhookOutcome, WebhookTransport};
use crate::writer::PersistenceWriter;
use parceltrack_core::dates::parse_valid_carrier_date;
use parceltrack_core::{
    resolve_return_location, transition, LifecycleClass, NormalizedEvent, Shipment, StatusCatalog,
};
use parceltrack_db::Database;

// =============================================================================
// Run Report
// =============================================================================

/// Structured result of one sync pass. Always produced, even on partial
/// failure, so the scheduler can log and move on.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRunReport {
    pub lifecycle: LifecycleClass,

    /// False only when the persistence layer failed the run wholesale.
    pub success: bool,

    /// Shipments the carrier returned data for.
    pub processed: usize,

    /// Shipments committed without error.
    pub succeeded: usize,

    /// Shipments whose commit failed.
    pub failed: usize,

    /// Carrier chunks that failed outright.
    pub fetch_failures: usize,

    /// Stores skipped for want of an active credential.
    pub stores_skipped: usize,

    /// Status changes accumulated for webhook dispatch.
    pub changes: usize,

    /// Webhook delivery outcome.
    pub webhook: WebhookOutcome,

    /// Post-sync consistency check, when it could be run.
    pub validation: Option<ValidationReport>,

    /// Error text when `success` is false.
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncRunReport {
    fn empty(lifecycle: LifecycleClass, started_at: DateTime<Utc>) -> Self {
        SyncRunReport {
            lifecycle,
            success: true,
            processed: 0,
            succeeded: 0,
            failed: 0,
            fetch_failures: 0,
            stores_skipped: 0,
            changes: 0,
            webhook: WebhookOutcome::default(),
            validation: None,
            error: None,
            started_at,
            finished_at: started_at,
        }
    }
}

// =============================================================================
// Run Guard
// =============================================================================

/// RAII release for a per-lifecycle run flag.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    /// Acquires the flag or reports the run as already in progress.
    fn acquire(flag: &'a AtomicBool, lifecycle: LifecycleClass) -> SyncResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SyncError::RunInProgress { lifecycle })?;
        Ok(RunGuard { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives complete sync passes over a carrier API and webhook transport.
pub struct SyncOrchestrator<C, T> {
    db: Database,
    config: SyncConfig,
    credentials: CredentialResolver,
    fetcher: BatchFetcher<C>,
    webhook: WebhookDispatcher<T>,
    writer: PersistenceWriter,
    active_running: AtomicBool,
    inactive_running: AtomicBool,
}

impl<C: CarrierApi, T: WebhookTransport> SyncOrchestrator<C, T> {
    /// Wires the engine together over the given carrier API and webhook
    /// transport.
    pub fn new(db: Database, config: SyncConfig, carrier: C, transport: T) -> Self {
        let credentials = CredentialResolver::new(db.credentials());
        let fetcher = BatchFetcher::new(
            carrier,
            config.carrier.chunk_size,
            Duration::from_millis(config.carrier.inter_chunk_delay_ms),
        );
        let webhook =
            WebhookDispatcher::new(transport, db.clone(), config.webhook.default_retry_count);
        let writer = PersistenceWriter::new(db.clone());

        SyncOrchestrator {
            db,
            config,
            credentials,
            fetcher,
            webhook,
            writer,
            active_running: AtomicBool::new(false),
            inactive_running: AtomicBool::new(false),
        }
    }

    fn guard_flag(&self, lifecycle: LifecycleClass) -> &AtomicBool {
        match lifecycle {
            LifecycleClass::Active => &self.active_running,
            LifecycleClass::Inactive => &self.inactive_running,
        }
    }

    /// Runs one sync pass for the given lifecycle class.
    ///
    /// Rejects immediately with [`SyncError::RunInProgress`] when a pass
    /// for the same class is still running; the other class is unaffected.
    /// Any other failure comes back inside the report, never as `Err`.
    #[instrument(skip(self), fields(lifecycle = %lifecycle))]
    pub async fn run(&self, lifecycle: LifecycleClass) -> SyncResult<SyncRunReport> {
        let _guard = RunGuard::acquire(self.guard_flag(lifecycle), lifecycle)?;
        let started_at = Utc::now();
        info!("Sync pass starting");

        let mut report = match self.run_inner(lifecycle, started_at).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Sync pass failed");
                let mut report = SyncRunReport::empty(lifecycle, started_at);
                report.success = false;
                report.error = Some(e.to_string());
                report
            }
        };
        report.finished_at = Utc::now();

        info!(
            success = report.success,
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            fetch_failures = report.fetch_failures,
            changes = report.changes,
            webhook_delivered = report.webhook.delivered,
            "Sync pass finished"
        );
        Ok(report)
    }

    async fn run_inner(
        &self,
        lifecycle: LifecycleClass,
        started_at: DateTime<Utc>,
    ) -> SyncResult<SyncRunReport> {
        let catalog = self.db.status_mappings().load_catalog().await?;
        let population = self.db.shipments().fetch_population(lifecycle).await?;
        debug!(population = population.len(), "Population loaded");

        let mut report = SyncRunReport::empty(lifecycle, started_at);
        let mut changes: Vec<StatusChange> = Vec::new();

        let stores = group_by_store(population);
        let store_count = stores.len();

        for (index, (account_code, shipments)) in stores.into_iter().enumerate() {
            if index > 0 && self.config.carrier.inter_store_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(
                    self.config.carrier.inter_store_delay_ms,
                ))
                .await;
            }

            let Some(credential) = self.credentials.resolve(&account_code).await? else {
                report.stores_skipped += 1;
                continue;
            };

            debug!(
                account_code = %account_code,
                shipments = shipments.len(),
                store = index + 1,
                stores = store_count,
                "Syncing store"
            );

            let waybills: Vec<String> = shipments.iter().map(|s| s.awb.clone()).collect();
            let outcome = self
                .fetcher
                .fetch_store(&credential.auth_token, &waybills)
                .await;
            report.fetch_failures += outcome.failed_chunks;

            self.process_store(
                &catalog,
                &shipments,
                outcome.results,
                &mut report,
                &mut changes,
            )
            .await;
        }

        report.changes = changes.len();
        report.webhook = match self.webhook.dispatch(&changes).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Webhook trouble is reported, never fatal to the pass.
                warn!(error = %e, "Webhook dispatch errored");
                WebhookOutcome {
                    delivered: false,
                    sent: 0,
                    attempts: 0,
                    skipped: None,
                    last_error: Some(e.to_string()),
                }
            }
        };

        report.validation = match post_sync_validation(&self.db).await {
            Ok(validation) => Some(validation),
            Err(e) => {
                warn!(error = %e, "Post-sync validation could not run");
                None
            }
        };

        Ok(report)
    }

    /// Normalizes, detects, and commits one store's fetched shipments,
    /// concurrently in chunk-sized waves so connection fan-out stays
    /// bounded by the batch size rather than the whole population.
    async fn process_store(
        &self,
        catalog: &StatusCatalog,
        shipments: &[Shipment],
        mut results: HashMap<String, TrackingDetails>,
        report: &mut SyncRunReport,
        changes: &mut Vec<StatusChange>,
    ) {
        let mut unmapped: HashSet<String> = HashSet::new();

        let fetched: Vec<(&Shipment, TrackingDetails)> = shipments
            .iter()
            .filter_map(|s| results.remove(&s.awb).map(|details| (s, details)))
            .collect();
        report.processed += fetched.len();

        for wave in fetched.chunks(self.config.carrier.chunk_size) {
            let commits = wave
                .iter()
                .map(|(shipment, details)| self.process_shipment(catalog, shipment, details));

            for result in futures_util::future::join_all(commits).await {
                match result {
                    Ok(outcome) => {
                        report.succeeded += 1;
                        if let Some(change) = outcome.change {
                            changes.push(change);
                        }
                        unmapped.extend(outcome.unmapped);
                    }
                    Err(e) => {
                        warn!(error = %e, "Shipment commit failed");
                        report.failed += 1;
                    }
                }
            }
        }

        for raw in unmapped {
            warn!(raw_status = %raw, "Unmapped carrier status, flag for mapping review");
        }
    }

    /// One shipment: normalize history, detect the transition, commit.
    /// Returns the status change to carry to the webhook (if any) plus
    /// raw statuses neither the catalog nor the fallback rules recognized.
    async fn process_shipment(
        &self,
        catalog: &StatusCatalog,
        shipment: &Shipment,
        details: &TrackingDetails,
    ) -> SyncResult<ShipmentOutcome> {
        let events = normalize_history(catalog, details);
        let unmapped: Vec<String> = events
            .iter()
            .filter(|e| !catalog.resolves(&e.raw_status))
            .map(|e| e.raw_status.clone())
            .collect();

        // Empty history means "no update this cycle", not a regression.
        let Some(detected) = transition::detect(
            &shipment.current_status,
            shipment.handover_at.is_some(),
            &events,
            catalog,
        ) else {
            return Ok(ShipmentOutcome {
                change: None,
                unmapped,
            });
        };

        let is_return = catalog.is_return(&detected.new_status)
            || events.iter().any(|e| catalog.is_return(&e.raw_status));
        let resolved = if is_return {
            resolve_return_location(
                &details.shipment_track_activities,
                details.delivered_to(),
                Utc::now(),
            )
        } else {
            None
        };

        let key = shipment.key();
        self.writer
            .commit(&key, &events, &detected, resolved.as_ref())
            .await?;

        let change = detected.status_changed.then(|| StatusChange {
            key,
            previous_status: shipment.current_status.clone(),
            new_status: detected.new_status,
        });

        Ok(ShipmentOutcome { change, unmapped })
    }
}

/// Per-shipment processing result.
struct ShipmentOutcome {
    change: Option<StatusChange>,
    unmapped: Vec<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Groups a lifecycle population (already ordered by store) into
/// per-store runs, preserving order.
fn group_by_store(population: Vec<Shipment>) -> Vec<(String, Vec<Shipment>)> {
    let mut stores: Vec<(String, Vec<Shipment>)> = Vec::new();
    for shipment in population {
        match stores.last_mut() {
            Some((account_code, group)) if *account_code == shipment.account_code => {
                group.push(shipment);
            }
            _ => stores.push((shipment.account_code.clone(), vec![shipment])),
        }
    }
    stores
}

/// Converts carrier activities into normalized events, dropping entries
/// with blank activity text or an invalid date.
fn normalize_history(catalog: &StatusCatalog, details: &TrackingDetails) -> Vec<NormalizedEvent> {
    details
        .shipment_track_activities
        .iter()
        .filter_map(|activity| {
            let raw = activity.activity.trim();
            if raw.is_empty() {
                return None;
            }
            let event_time = parse_valid_carrier_date(&activity.date)?;

            Some(NormalizedEvent {
                status: catalog.normalize(raw),
                raw_status: raw.to_string(),
                event_time,
                activity: Some(activity.activity.clone()),
                location: if activity.location.trim().is_empty() {
                    None
                } else {
                    Some(activity.location.clone())
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{ShipmentDetail, TrackingResult};
    use parceltrack_core::RawActivity;
    use parceltrack_db::repository::shipment::new_shipment;
    use parceltrack_db::{DbConfig, KEY_WEBHOOK_URL};
    use std::sync::Arc;
    use tokio::sync::{Mutex, Notify};

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Clone, Default)]
    struct FakeCarrier {
        /// awb → scripted activities.
        histories: Arc<Mutex<HashMap<String, Vec<RawActivity>>>>,
        /// When set, fetch blocks until notified (guard tests).
        hold: Option<Arc<Notify>>,
    }

    impl FakeCarrier {
        async fn script(&self, awb: &str, activities: Vec<RawActivity>) {
            self.histories
                .lock()
                .await
                .insert(awb.to_string(), activities);
        }
    }

    impl CarrierApi for FakeCarrier {
        async fn fetch_chunk(
            &self,
            _auth_token: &str,
            waybills: &[String],
        ) -> SyncResult<Vec<TrackingResult>> {
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            let histories = self.histories.lock().await;
            Ok(waybills
                .iter()
                .filter_map(|awb| {
                    histories.get(awb).map(|activities| TrackingResult {
                        awb: awb.clone(),
                        tracking_details: Some(TrackingDetails {
                            shipment_status: None,
                            shipment_details: vec![ShipmentDetail {
                                delivered_to: Some("Origin Warehouse".into()),
                            }],
                            shipment_track_activities: activities.clone(),
                        }),
                    })
                })
                .collect())
        }
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        posts: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl WebhookTransport for FakeTransport {
        async fn post(&self, _url: &str, body: &serde_json::Value) -> SyncResult<u16> {
            self.posts.lock().await.push(body.clone());
            Ok(200)
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn activity(date: &str, text: &str, location: &str) -> RawActivity {
        RawActivity {
            date: date.to_string(),
            activity: text.to_string(),
            location: location.to_string(),
        }
    }

    fn quick_config() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.carrier.inter_chunk_delay_ms = 0;
        config.carrier.inter_store_delay_ms = 0;
        config
    }

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.credentials()
            .upsert(&parceltrack_core::StoreCredential {
                account_code: "store-a".into(),
                status: "active".into(),
                auth_token: "token".into(),
            })
            .await
            .unwrap();
        db
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_full_pass_commits_and_dispatches() {
        let db = seeded_db().await;
        db.shipments()
            .insert(&new_shipment("ORD-1", "store-a", "AWB-1"))
            .await
            .unwrap();
        db.app_config()
            .set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();

        let carrier = FakeCarrier::default();
        carrier
            .script(
                "AWB-1",
                vec![
                    activity("2026-01-10 08:00:00", "Picked Up", "Lahore"),
                    activity("2026-01-12 17:45:00", "Delivered", "Karachi"),
                ],
            )
            .await;
        let transport = FakeTransport::default();

        let orchestrator =
            SyncOrchestrator::new(db.clone(), quick_config(), carrier, transport.clone());
        let report = orchestrator.run(LifecycleClass::Active).await.unwrap();

        assert!(report.success);
        assert_eq!(report.processed, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.changes, 1);
        assert!(report.webhook.delivered);
        assert_eq!(report.webhook.sent, 1);

        let key = parceltrack_core::ShipmentKey::new("ORD-1", "store-a");
        let shipment = db.shipments().get_by_key(&key).await.unwrap().unwrap();
        assert_eq!(shipment.current_status, "Delivered");
        assert_eq!(shipment.lifecycle, LifecycleClass::Inactive);
        assert!(shipment.is_handover);
        assert_eq!(db.tracking_events().count().await.unwrap(), 2);

        let posts = transport.posts.lock().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["orders"][0]["current_shipment_status"], "Delivered");
    }

    #[tokio::test]
    async fn test_rerun_with_same_data_changes_nothing() {
        let db = seeded_db().await;
        db.shipments()
            .insert(&new_shipment("ORD-1", "store-a", "AWB-1"))
            .await
            .unwrap();

        let carrier = FakeCarrier::default();
        carrier
            .script(
                "AWB-1",
                vec![activity("2026-01-10 08:00:00", "Picked Up", "Lahore")],
            )
            .await;
        let transport = FakeTransport::default();
        let orchestrator =
            SyncOrchestrator::new(db.clone(), quick_config(), carrier, transport.clone());

        let first = orchestrator.run(LifecycleClass::Active).await.unwrap();
        assert_eq!(first.changes, 1);

        let second = orchestrator.run(LifecycleClass::Active).await.unwrap();
        assert!(second.success);
        // Same status again: committed but no change to dispatch.
        assert_eq!(second.changes, 0);
        assert_eq!(db.tracking_events().count().await.unwrap(), 1);
        // No webhook URL configured and no changes anyway: zero posts.
        assert!(transport.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_return_shipment_records_warehouse() {
        let db = seeded_db().await;
        db.shipments()
            .insert(&new_shipment("ORD-9", "store-a", "AWB-9"))
            .await
            .unwrap();

        let carrier = FakeCarrier::default();
        carrier
            .script(
                "AWB-9",
                vec![
                    activity("2026-01-10 08:00:00", "RTO Initiated", "Karachi Hub"),
                    activity("2026-01-13 10:00:00", "RTO Delivered", "Origin Warehouse"),
                    activity("", "RTO Delivered", "Phantom Depot"),
                ],
            )
            .await;
        let orchestrator = SyncOrchestrator::new(
            db.clone(),
            quick_config(),
            carrier,
            FakeTransport::default(),
        );

        let report = orchestrator.run(LifecycleClass::Active).await.unwrap();
        assert_eq!(report.succeeded, 1);

        let key = parceltrack_core::ShipmentKey::new("ORD-9", "store-a");
        let record = db.return_warehouse().get(&key).await.unwrap().unwrap();
        // Latest VALID activity wins; the undated one never does.
        assert_eq!(record.location, "Origin Warehouse");
    }

    #[tokio::test]
    async fn test_store_without_credential_is_skipped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.shipments()
            .insert(&new_shipment("ORD-1", "store-unknown", "AWB-1"))
            .await
            .unwrap();

        let orchestrator = SyncOrchestrator::new(
            db,
            quick_config(),
            FakeCarrier::default(),
            FakeTransport::default(),
        );
        let report = orchestrator.run(LifecycleClass::Active).await.unwrap();

        assert!(report.success);
        assert_eq!(report.stores_skipped, 1);
        assert_eq!(report.processed, 0);
    }

    #[tokio::test]
    async fn test_run_guard_rejects_same_class_admits_other() {
        let db = seeded_db().await;
        db.shipments()
            .insert(&new_shipment("ORD-1", "store-a", "AWB-1"))
            .await
            .unwrap();

        let hold = Arc::new(Notify::new());
        let carrier = FakeCarrier {
            histories: Arc::new(Mutex::new(HashMap::new())),
            hold: Some(hold.clone()),
        };
        let orchestrator = Arc::new(SyncOrchestrator::new(
            db,
            quick_config(),
            carrier,
            FakeTransport::default(),
        ));

        let background = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.run(LifecycleClass::Active).await })
        };

        // Let the first run reach the blocked carrier call.
        tokio::task::yield_now().await;

        let rejected = orchestrator.run(LifecycleClass::Active).await;
        assert!(matches!(
            rejected,
            Err(SyncError::RunInProgress {
                lifecycle: LifecycleClass::Active
            })
        ));

        // The other lifecycle class has its own guard.
        let inactive = orchestrator.run(LifecycleClass::Inactive).await.unwrap();
        assert!(inactive.success);

        hold.notify_one();
        let first = background.await.unwrap().unwrap();
        assert!(first.success);

        // Guard released: the class can run again.
        hold.notify_one();
        assert!(orchestrator.run(LifecycleClass::Active).await.is_ok());
    }

    #[tokio::test]
    async fn test_unmapped_flags_only_unrecognized_statuses() {
        let db = seeded_db().await;
        db.shipments()
            .insert(&new_shipment("ORD-1", "store-a", "AWB-1"))
            .await
            .unwrap();
        let orchestrator = SyncOrchestrator::new(
            db.clone(),
            quick_config(),
            FakeCarrier::default(),
            FakeTransport::default(),
        );

        let catalog = StatusCatalog::empty();
        let key = parceltrack_core::ShipmentKey::new("ORD-1", "store-a");
        let shipment = db.shipments().get_by_key(&key).await.unwrap().unwrap();
        let details = TrackingDetails {
            shipment_status: None,
            shipment_details: vec![],
            shipment_track_activities: vec![
                // A fallback rule maps "Delivered" to itself: recognized.
                activity("2026-01-10 08:00:00", "Delivered", "Karachi"),
                activity("2026-01-11 08:00:00", "Held At Customs", "Karachi"),
            ],
        };

        let outcome = orchestrator
            .process_shipment(&catalog, &shipment, &details)
            .await
            .unwrap();
        assert_eq!(outcome.unmapped, vec!["Held At Customs".to_string()]);
    }

    #[test]
    fn test_group_by_store_preserves_order() {
        let stores = group_by_store(vec![
            new_shipment("ORD-1", "store-a", "AWB-1"),
            new_shipment("ORD-2", "store-a", "AWB-2"),
            new_shipment("ORD-3", "store-b", "AWB-3"),
        ]);
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].0, "store-a");
        assert_eq!(stores[0].1.len(), 2);
        assert_eq!(stores[1].0, "store-b");
    }

    #[test]
    fn test_normalize_history_drops_invalid_entries() {
        let catalog = StatusCatalog::empty();
        let details = TrackingDetails {
            shipment_status: None,
            shipment_details: vec![],
            shipment_track_activities: vec![
                activity("2026-01-10 08:00:00", "Picked Up", "Lahore"),
                activity("", "Delivered", "Karachi"),
                activity("2026-01-11 08:00:00", "   ", "Karachi"),
                activity("1970-01-01 00:00:00", "Delivered", "Karachi"),
            ],
        };

        let events = normalize_history(&catalog, &details);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, "In Transit");
        assert_eq!(events[0].raw_status, "Picked Up");
    }
}
