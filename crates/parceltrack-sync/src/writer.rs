//! # Persistence Writer
//!
//! Applies one shipment's sync outcome in a single transaction.
//!
//! ## Commit Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One Transaction Per Shipment                            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. INSERT OR IGNORE each normalized event (dedup key)                │
//! │    2. UPDATE projection: current_status, lifecycle                      │
//! │    3. UPDATE handover fields — only if handover_at IS NULL              │
//! │    4. UPSERT return warehouse record — only on return shipments,        │
//! │       only when the observation is at least as recent                   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Every step is individually idempotent, so re-running a commit with     │
//! │  identical fetched data is a no-op: zero new events, same projection.   │
//! │  A failure partway rolls the whole shipment back, so the projection     │
//! │  can never reference events that were not actually inserted.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, instrument};

use crate::error::SyncResult;
use parceltrack_core::{NormalizedEvent, ShipmentKey, Transition};
use parceltrack_core::returns::ResolvedReturnLocation;
use parceltrack_db::{
    Database, DbError, ReturnWarehouseRepository, ShipmentRepository, TrackingEventRepository,
};

/// What one commit actually changed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommitOutcome {
    /// Events not previously present by the dedup key.
    pub events_inserted: usize,

    /// True when this commit set the handover fields (first write).
    pub handover_recorded: bool,

    /// True when this commit wrote the return warehouse record.
    pub return_recorded: bool,
}

/// Writes sync outcomes transactionally, one shipment at a time.
#[derive(Clone)]
pub struct PersistenceWriter {
    db: Database,
}

impl PersistenceWriter {
    /// Creates a writer over the given database handle.
    pub fn new(db: Database) -> Self {
        PersistenceWriter { db }
    }

    /// Commits one shipment's events, projection update, and (for return
    /// shipments) the resolved warehouse location.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn commit(
        &self,
        key: &ShipmentKey,
        events: &[NormalizedEvent],
        transition: &Transition,
        return_location: Option<&ResolvedReturnLocation>,
    ) -> SyncResult<CommitOutcome> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let events_inserted = TrackingEventRepository::insert_batch(&mut tx, key, events).await?;

        ShipmentRepository::update_projection(
            &mut tx,
            key,
            &transition.new_status,
            transition.lifecycle,
        )
        .await?;

        let handover_recorded = match transition.handover_at {
            Some(at) => ShipmentRepository::record_handover(&mut tx, key, at).await?,
            None => false,
        };

        let return_recorded = match return_location {
            Some(resolved) => {
                ReturnWarehouseRepository::upsert(
                    &mut tx,
                    key,
                    &resolved.location,
                    resolved.observed_at,
                    resolved.source,
                )
                .await?
            }
            None => false,
        };

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            events_inserted,
            handover_recorded,
            return_recorded,
            new_status = %transition.new_status,
            "Shipment committed"
        );

        Ok(CommitOutcome {
            events_inserted,
            handover_recorded,
            return_recorded,
        })
    }
}
