//! # Store Credential Repository
//!
//! Carrier-API credential lookup by store. The sync engine's credential
//! resolver caches these in memory for the process lifetime; this
//! repository is the storage behind that cache.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use parceltrack_core::StoreCredential;

/// Repository for store credential lookups.
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    /// Creates a new CredentialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CredentialRepository { pool }
    }

    /// Gets the credential for one store, if any.
    pub async fn get(&self, account_code: &str) -> DbResult<Option<StoreCredential>> {
        let credential = sqlx::query_as::<_, StoreCredential>(
            "SELECT account_code, status, auth_token FROM store_credentials WHERE account_code = ?1",
        )
        .bind(account_code)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            account_code,
            found = credential.is_some(),
            "Credential lookup"
        );
        Ok(credential)
    }

    /// Upserts a credential (used by provisioning collaborators and tests).
    pub async fn upsert(&self, credential: &StoreCredential) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO store_credentials (account_code, status, auth_token)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (account_code) DO UPDATE SET
                status = excluded.status,
                auth_token = excluded.auth_token
            "#,
        )
        .bind(&credential.account_code)
        .bind(&credential.status)
        .bind(&credential.auth_token)
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
    async fn test_get_missing_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.credentials().get("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.credentials();
        repo.upsert(&StoreCredential {
            account_code: "store-a".into(),
            status: "active".into(),
            auth_token: "token-1".into(),
        })
        .await
        .unwrap();

        let cred = repo.get("store-a").await.unwrap().unwrap();
        assert!(cred.is_active());
        assert_eq!(cred.auth_token, "token-1");
    }
}
