//! # Credential Resolver
//!
//! Maps a store to its carrier-API credential, with a process-lifetime
//! in-memory cache populated on first use.
//!
//! The cache is an explicit component with injected storage, not an
//! ambient singleton; the orchestrator owns one instance and hands it to
//! whoever needs tokens. Values are read-mostly: a race double-populating
//! a store is harmless because both writers insert equal values.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::SyncResult;
use parceltrack_db::CredentialRepository;
use parceltrack_core::StoreCredential;

/// Resolves and caches per-store carrier credentials.
#[derive(Clone)]
pub struct CredentialResolver {
    repository: CredentialRepository,
    cache: Arc<RwLock<HashMap<String, StoreCredential>>>,
}

impl CredentialResolver {
    /// Creates a resolver backed by the given repository.
    pub fn new(repository: CredentialRepository) -> Self {
        CredentialResolver {
            repository,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolves the active credential for a store.
    ///
    /// `Ok(None)` means the store has no usable credential this cycle
    /// (missing row or non-active status) and should be skipped, not
    /// failed. Only active credentials are cached.
    pub async fn resolve(&self, account_code: &str) -> SyncResult<Option<StoreCredential>> {
        {
            let cache = self.cache.read().await;
            if let Some(credential) = cache.get(account_code) {
                debug!(account_code, "Credential cache hit");
                return Ok(Some(credential.clone()));
            }
        }

        let Some(credential) = self.repository.get(account_code).await? else {
            warn!(account_code, "No carrier credential on file, skipping store");
            return Ok(None);
        };

        if !credential.is_active() {
            warn!(
                account_code,
                status = %credential.status,
                "Carrier credential not active, skipping store"
            );
            return Ok(None);
        }

        self.cache
            .write()
            .await
            .insert(account_code.to_string(), credential.clone());
        debug!(account_code, "Credential cached");

        Ok(Some(credential))
    }

    /// Number of cached credentials. Test and diagnostics hook.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}
