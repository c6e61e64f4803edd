//! # Return Warehouse Repository
//!
//! Upsert access to the return-disposition record.
//!
//! The guard is in the SQL: the conflict branch only applies when the
//! incoming observation is at least as recent as the stored one, so a sync
//! pass working from stale carrier data can never roll the location back.
//! Activity-sourced observations additionally outrank carrier-declared
//! fallbacks outright, whose observed_at is only a wall-clock stamp.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use parceltrack_core::{ReturnLocationSource, ReturnWarehouseRecord, ShipmentKey};

/// Repository for return warehouse records.
#[derive(Debug, Clone)]
pub struct ReturnWarehouseRepository {
    pool: SqlitePool,
}

impl ReturnWarehouseRepository {
    /// Creates a new ReturnWarehouseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReturnWarehouseRepository { pool }
    }

    /// Upserts the disposition record inside a caller transaction.
    ///
    /// Within one source, the newest observation wins and an older
    /// `observed_at` leaves the stored row untouched. Across sources, an
    /// activity-sourced observation always replaces a carrier-declared
    /// fallback regardless of dates, and never the other way around.
    /// Returns true when a row was written.
    pub async fn upsert(
        conn: &mut SqliteConnection,
        key: &ShipmentKey,
        location: &str,
        observed_at: DateTime<Utc>,
        source: ReturnLocationSource,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO return_warehouse_records (
                order_id, account_code, location, observed_at, source, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (order_id, account_code) DO UPDATE SET
                location = excluded.location,
                observed_at = excluded.observed_at,
                source = excluded.source,
                updated_at = excluded.updated_at
            WHERE (excluded.source = 'activity'
                   AND return_warehouse_records.source = 'carrier_declared')
               OR (excluded.source = return_warehouse_records.source
                   AND excluded.observed_at >= return_warehouse_records.observed_at)
            "#,
        )
        .bind(&key.order_id)
        .bind(&key.account_code)
        .bind(location)
        .bind(observed_at)
        .bind(source)
        .bind(now)
        .execute(conn)
        .await?;

        let written = result.rows_affected() > 0;
        debug!(key = %key, location, written, "Return warehouse upsert");
        Ok(written)
    }

    /// Gets the record for a shipment.
    pub async fn get(&self, key: &ShipmentKey) -> DbResult<Option<ReturnWarehouseRecord>> {
        let record = sqlx::query_as::<_, ReturnWarehouseRecord>(
            r#"
            SELECT order_id, account_code, location, observed_at, source, updated_at
            FROM return_warehouse_records
            WHERE order_id = ?1 AND account_code = ?2
            "#,
        )
        .bind(&key.order_id)
        .bind(&key.account_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
