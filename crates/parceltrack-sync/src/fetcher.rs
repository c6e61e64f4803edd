//! # Batch Fetcher
//!
//! Chunks a store's waybills into carrier-sized batches and issues one
//! tracking call per chunk.
//!
//! ## Failure Containment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   waybills (N) ──► chunks of ≤ chunk_size                               │
//! │                                                                         │
//! │   chunk 1 ──► carrier call ──► entries merged into result map           │
//! │      ▼ delay                                                            │
//! │   chunk 2 ──► carrier call ──✗ FAILS: counted, chunk's waybills         │
//! │      ▼ delay                   simply absent from the map               │
//! │   chunk 3 ──► carrier call ──► entries merged into result map           │
//! │                                                                         │
//! │   A chunk failure never aborts the other chunks, and an absent map      │
//! │   entry downstream means "no update this cycle", never an error.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::carrier::{CarrierApi, TrackingDetails};

/// Result of fetching one store's population.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Waybill → tracking payload. Absent waybills had no carrier data.
    pub results: HashMap<String, TrackingDetails>,

    /// Chunks issued this store.
    pub chunks_issued: usize,

    /// Chunks whose carrier call failed.
    pub failed_chunks: usize,
}

/// Fetches tracking data in rate-limited chunks.
pub struct BatchFetcher<C> {
    api: C,
    chunk_size: usize,
    inter_chunk_delay: Duration,
}

impl<C: CarrierApi> BatchFetcher<C> {
    /// Creates a fetcher over the given carrier API.
    pub fn new(api: C, chunk_size: usize, inter_chunk_delay: Duration) -> Self {
        BatchFetcher {
            api,
            chunk_size,
            inter_chunk_delay,
        }
    }

    /// Fetches tracking payloads for one store's waybills.
    ///
    /// Chunks are issued sequentially with a delay between them; failures
    /// are counted per chunk and never propagated.
    pub async fn fetch_store(&self, auth_token: &str, waybills: &[String]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for (index, chunk) in waybills.chunks(self.chunk_size).enumerate() {
            if index > 0 && !self.inter_chunk_delay.is_zero() {
                tokio::time::sleep(self.inter_chunk_delay).await;
            }
            outcome.chunks_issued += 1;

            match self.api.fetch_chunk(auth_token, chunk).await {
                Ok(results) => {
                    debug!(
                        chunk = index,
                        requested = chunk.len(),
                        returned = results.len(),
                        "Chunk fetched"
                    );
                    for result in results {
                        if let Some(details) = result.tracking_details {
                            outcome.results.insert(result.awb, details);
                        }
                    }
                }
                Err(e) => {
                    warn!(chunk = index, waybills = chunk.len(), error = %e, "Chunk fetch failed");
                    outcome.failed_chunks += 1;
                }
            }
        }

        outcome
    }
}
