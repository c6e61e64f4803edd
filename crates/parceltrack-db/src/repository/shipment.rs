//! # Shipment Repository
//!
//! Database operations for the shipment projection.
//!
//! ## Projection Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Shipment Projection                                 │
//! │                                                                         │
//! │  current_status / lifecycle                                            │
//! │     └── overwritten every sync pass from the transition result         │
//! │                                                                         │
//! │  is_handover / handover_at                                             │
//! │     └── FIRST WRITE WINS. The guard lives in the SQL itself            │
//! │         (WHERE handover_at IS NULL), so re-running a sync with an      │
//! │         earlier-qualifying event can never move a recorded handover.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use parceltrack_core::{LifecycleClass, Shipment, ShipmentKey};

/// Repository for shipment database operations.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: SqlitePool,
}

const SHIPMENT_COLUMNS: &str = r#"
    id, order_id, account_code, awb, carrier_id,
    current_status, lifecycle, is_handover, handover_at,
    created_at, updated_at
"#;

impl ShipmentRepository {
    /// Creates a new ShipmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShipmentRepository { pool }
    }

    /// Gets a shipment by its composite key.
    pub async fn get_by_key(&self, key: &ShipmentKey) -> DbResult<Option<Shipment>> {
        let sql = format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE order_id = ?1 AND account_code = ?2"
        );
        let shipment = sqlx::query_as::<_, Shipment>(&sql)
            .bind(&key.order_id)
            .bind(&key.account_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shipment)
    }

    /// Fetches the sync population for one lifecycle class, ordered by
    /// store so the orchestrator can group without re-sorting.
    ///
    /// The partition by lifecycle happens here, in one query, which is what
    /// keeps the active and inactive passes from ever seeing the same
    /// shipment in the same cycle.
    pub async fn fetch_population(&self, lifecycle: LifecycleClass) -> DbResult<Vec<Shipment>> {
        let sql = format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments \
             WHERE lifecycle = ?1 ORDER BY account_code, order_id"
        );
        let shipments = sqlx::query_as::<_, Shipment>(&sql)
            .bind(lifecycle.to_string())
            .fetch_all(&self.pool)
            .await?;

        debug!(
            lifecycle = %lifecycle,
            count = shipments.len(),
            "Fetched sync population"
        );

        Ok(shipments)
    }

    /// Bulk-fetches shipments for a set of keys in one query. Used by
    /// webhook preparation for carrier/waybill enrichment.
    pub async fn get_by_keys(&self, keys: &[ShipmentKey]) -> DbResult<Vec<Shipment>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE (order_id, account_code) IN "
        ));
        qb.push_tuples(keys, |mut b, key| {
            b.push_bind(key.order_id.clone());
            b.push_bind(key.account_code.clone());
        });

        let shipments: Vec<Shipment> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(shipments)
    }

    /// Inserts a new shipment row (used by intake collaborators and tests).
    pub async fn insert(&self, shipment: &Shipment) -> DbResult<()> {
        debug!(key = %shipment.key(), awb = %shipment.awb, "Inserting shipment");

        sqlx::query(
            r#"
            INSERT INTO shipments (
                id, order_id, account_code, awb, carrier_id,
                current_status, lifecycle, is_handover, handover_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&shipment.id)
        .bind(&shipment.order_id)
        .bind(&shipment.account_code)
        .bind(&shipment.awb)
        .bind(&shipment.carrier_id)
        .bind(&shipment.current_status)
        .bind(shipment.lifecycle.to_string())
        .bind(shipment.is_handover)
        .bind(shipment.handover_at)
        .bind(shipment.created_at)
        .bind(shipment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the status/lifecycle projection inside a caller transaction.
    pub async fn update_projection(
        conn: &mut SqliteConnection,
        key: &ShipmentKey,
        new_status: &str,
        lifecycle: LifecycleClass,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE shipments SET
                current_status = ?3,
                lifecycle = ?4,
                updated_at = ?5
            WHERE order_id = ?1 AND account_code = ?2
            "#,
        )
        .bind(&key.order_id)
        .bind(&key.account_code)
        .bind(new_status)
        .bind(lifecycle.to_string())
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shipment", key.to_string()));
        }

        Ok(())
    }

    /// Records the handover fields inside a caller transaction.
    ///
    /// First write wins: the `handover_at IS NULL` guard makes repeat calls
    /// (and late discoveries of earlier-qualifying events) no-ops. Returns
    /// true when this call actually set the fields.
    pub async fn record_handover(
        conn: &mut SqliteConnection,
        key: &ShipmentKey,
        handover_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE shipments SET
                is_handover = 1,
                handover_at = ?3,
                updated_at = ?4
            WHERE order_id = ?1 AND account_code = ?2 AND handover_at IS NULL
            "#,
        )
        .bind(&key.order_id)
        .bind(&key.account_code)
        .bind(handover_at)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts shipments flagged as handed over. Used by post-sync validation.
    pub async fn count_handed_over(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shipments WHERE is_handover = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Counts shipments that have at least one tracking event. Used by
    /// post-sync validation alongside `count_handed_over`.
    pub async fn count_tracked(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM shipments s
            WHERE EXISTS (
                SELECT 1 FROM tracking_events e
                WHERE e.order_id = s.order_id AND e.account_code = s.account_code
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

/// Builds a fresh shipment row for intake.
pub fn new_shipment(
    order_id: impl Into<String>,
    account_code: impl Into<String>,
    awb: impl Into<String>,
) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.into(),
        account_code: account_code.into(),
        awb: awb.into(),
        carrier_id: None,
        current_status: parceltrack_core::STATUS_AWB_ASSIGNED.to_string(),
        lifecycle: LifecycleClass::Active,
        is_handover: false,
        handover_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_population() {
        let db = test_db().await;
        let repo = db.shipments();

        repo.insert(&new_shipment("ORD-1", "store-a", "AWB-1"))
            .await
            .unwrap();
        repo.insert(&new_shipment("ORD-2", "store-b", "AWB-2"))
            .await
            .unwrap();

        let active = repo.fetch_population(LifecycleClass::Active).await.unwrap();
        assert_eq!(active.len(), 2);

        let inactive = repo
            .fetch_population(LifecycleClass::Inactive)
            .await
            .unwrap();
        assert!(inactive.is_empty());
    }

    #[tokio::test]
    async fn test_projection_update() {
        let db = test_db().await;
        let repo = db.shipments();
        let shipment = new_shipment("ORD-1", "store-a", "AWB-1");
        repo.insert(&shipment).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        ShipmentRepository::update_projection(
            &mut conn,
            &shipment.key(),
            "Delivered",
            LifecycleClass::Inactive,
        )
        .await
        .unwrap();
        drop(conn);

        let updated = repo.get_by_key(&shipment.key()).await.unwrap().unwrap();
        assert_eq!(updated.current_status, "Delivered");
        assert_eq!(updated.lifecycle, LifecycleClass::Inactive);
    }

    #[tokio::test]
    async fn test_handover_first_write_wins() {
        let db = test_db().await;
        let repo = db.shipments();
        let shipment = new_shipment("ORD-1", "store-a", "AWB-1");
        repo.insert(&shipment).await.unwrap();

        let first = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(
            ShipmentRepository::record_handover(&mut conn, &shipment.key(), first)
                .await
                .unwrap()
        );
        // A later sync discovering an earlier event must not rewrite it.
        assert!(
            !ShipmentRepository::record_handover(&mut conn, &shipment.key(), earlier)
                .await
                .unwrap()
        );
        drop(conn);

        let updated = repo.get_by_key(&shipment.key()).await.unwrap().unwrap();
        assert!(updated.is_handover);
        assert_eq!(updated.handover_at, Some(first));
    }

    #[tokio::test]
    async fn test_update_missing_shipment_is_not_found() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let err = ShipmentRepository::update_projection(
            &mut conn,
            &ShipmentKey::new("nope", "nowhere"),
            "Delivered",
            LifecycleClass::Inactive,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
