//! # Tracking Event Repository
//!
//! Append-only tracking history with idempotent inserts.
//!
//! The dedup key is (order_id, account_code, status, event_time), enforced
//! by a UNIQUE index. Inserts go through `INSERT OR IGNORE`, so re-running
//! a sync pass with identical fetched data inserts nothing and the history
//! stays exactly-once per distinct event.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use parceltrack_core::{NormalizedEvent, ShipmentKey, TrackingEvent};

/// Repository for tracking event operations.
#[derive(Debug, Clone)]
pub struct TrackingEventRepository {
    pool: SqlitePool,
}

impl TrackingEventRepository {
    /// Creates a new TrackingEventRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TrackingEventRepository { pool }
    }

    /// Inserts one normalized event inside a caller transaction, skipping
    /// duplicates. Returns true when a row was actually inserted.
    pub async fn insert_if_absent(
        conn: &mut SqliteConnection,
        key: &ShipmentKey,
        event: &NormalizedEvent,
    ) -> DbResult<bool> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO tracking_events (
                id, order_id, account_code, status, event_time,
                activity, location, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&key.order_id)
        .bind(&key.account_code)
        .bind(&event.status)
        .bind(event.event_time)
        .bind(&event.activity)
        .bind(&event.location)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Inserts a batch of normalized events inside a caller transaction.
    /// Returns how many were new (not already present by the dedup key).
    pub async fn insert_batch(
        conn: &mut SqliteConnection,
        key: &ShipmentKey,
        events: &[NormalizedEvent],
    ) -> DbResult<usize> {
        let mut inserted = 0;
        for event in events {
            if Self::insert_if_absent(conn, key, event).await? {
                inserted += 1;
            }
        }

        debug!(
            key = %key,
            total = events.len(),
            inserted,
            "Inserted tracking events"
        );

        Ok(inserted)
    }

    /// Gets the full history for a shipment, oldest first.
    pub async fn get_for_shipment(&self, key: &ShipmentKey) -> DbResult<Vec<TrackingEvent>> {
        let events = sqlx::query_as::<_, TrackingEvent>(
            r#"
            SELECT id, order_id, account_code, status, event_time,
                   activity, location, created_at
            FROM tracking_events
            WHERE order_id = ?1 AND account_code = ?2
            ORDER BY event_time
            "#,
        )
        .bind(&key.order_id)
        .bind(&key.account_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Counts all stored events (diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracking_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;

    fn event(status: &str, day: u32) -> NormalizedEvent {
        NormalizedEvent {
            status: status.to_string(),
            raw_status: status.to_uppercase(),
            event_time: Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap(),
            activity: Some("scan".to_string()),
            location: Some("Hub".to_string()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_events_are_ignored() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tracking_events();
        let key = ShipmentKey::new("ORD-1", "store-a");
        let events = vec![event("In Transit", 10), event("Delivered", 12)];

        let mut conn = db.pool().acquire().await.unwrap();
        let first = TrackingEventRepository::insert_batch(&mut conn, &key, &events)
            .await
            .unwrap();
        // Identical batch again: nothing new.
        let second = TrackingEventRepository::insert_batch(&mut conn, &key, &events)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(repo.count().await.unwrap(), 2);

        let history = repo.get_for_shipment(&key).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, "In Transit"); // oldest first
    }

    #[tokio::test]
    async fn test_same_status_different_time_is_distinct() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let key = ShipmentKey::new("ORD-1", "store-a");

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(
            TrackingEventRepository::insert_if_absent(&mut conn, &key, &event("In Transit", 10))
                .await
                .unwrap()
        );
        assert!(
            TrackingEventRepository::insert_if_absent(&mut conn, &key, &event("In Transit", 11))
                .await
                .unwrap()
        );
    }
}
