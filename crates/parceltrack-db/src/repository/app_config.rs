//! # App Config Repository
//!
//! Mutable key-value configuration store. The webhook dispatcher reads its
//! endpoint URL and retry ceiling from here at dispatch time, so operators
//! can change them without restarting the process.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Config key: webhook endpoint URL. Absence skips delivery.
pub const KEY_WEBHOOK_URL: &str = "shipment_webhook_url";

/// Config key: webhook retry-attempt ceiling override.
pub const KEY_WEBHOOK_RETRY_COUNT: &str = "shipment_webhook_retry_count";

/// Repository for key-value app configuration.
#[derive(Debug, Clone)]
pub struct AppConfigRepository {
    pool: SqlitePool,
}

impl AppConfigRepository {
    /// Creates a new AppConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AppConfigRepository { pool }
    }

    /// Gets a config value, if set.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM app_config WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key, found = value.is_some(), "Config lookup");
        Ok(value)
    }

    /// Gets a config value parsed as an integer; None when absent or junk.
    pub async fn get_u32(&self, key: &str) -> DbResult<Option<u32>> {
        Ok(self.get(key).await?.and_then(|v| v.trim().parse().ok()))
    }

    /// Sets a config value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app_config (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.app_config();

        assert!(repo.get(KEY_WEBHOOK_URL).await.unwrap().is_none());

        repo.set(KEY_WEBHOOK_URL, "https://example.com/hook")
            .await
            .unwrap();
        assert_eq!(
            repo.get(KEY_WEBHOOK_URL).await.unwrap().unwrap(),
            "https://example.com/hook"
        );

        repo.set(KEY_WEBHOOK_RETRY_COUNT, "5").await.unwrap();
        assert_eq!(
            repo.get_u32(KEY_WEBHOOK_RETRY_COUNT).await.unwrap(),
            Some(5)
        );

        repo.set(KEY_WEBHOOK_RETRY_COUNT, "junk").await.unwrap();
        assert_eq!(repo.get_u32(KEY_WEBHOOK_RETRY_COUNT).await.unwrap(), None);
    }
}
