//! # Status Mapping Repository
//!
//! Read access to the raw-status → canonical-status lookup table. An
//! external collaborator owns writes; the sync engine loads the whole
//! table once per pass and hands it to the core catalog.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use parceltrack_core::{StatusCatalog, StatusMapping};

/// Repository for status mapping lookups.
#[derive(Debug, Clone)]
pub struct StatusMappingRepository {
    pool: SqlitePool,
}

impl StatusMappingRepository {
    /// Creates a new StatusMappingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatusMappingRepository { pool }
    }

    /// Loads every mapping row.
    pub async fn load_all(&self) -> DbResult<Vec<StatusMapping>> {
        let mappings = sqlx::query_as::<_, StatusMapping>(
            "SELECT raw_status, renamed, is_handover, is_return FROM status_mappings",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = mappings.len(), "Loaded status mappings");
        Ok(mappings)
    }

    /// Loads the table straight into a core catalog.
    pub async fn load_catalog(&self) -> DbResult<StatusCatalog> {
        Ok(StatusCatalog::new(self.load_all().await?))
    }

    /// Upserts one mapping row (used by seeding and tests; production
    /// writes come from the mapping-management collaborator).
    pub async fn upsert(&self, mapping: &StatusMapping) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO status_mappings (raw_status, renamed, is_handover, is_return)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (raw_status) DO UPDATE SET
                renamed = excluded.renamed,
                is_handover = excluded.is_handover,
                is_return = excluded.is_return
            "#,
        )
        .bind(&mapping.raw_status)
        .bind(&mapping.renamed)
        .bind(mapping.is_handover)
        .bind(mapping.is_return)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
