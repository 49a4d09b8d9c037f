//! Chunked insert driver
//!
//! Splits an ordered record sequence into fixed-size groups and submits them
//! to the store sequentially. The first store failure aborts the run and
//! surfaces the number of records committed by prior chunks; there is no
//! rollback and no retry. Cancellation is observed at chunk boundaries:
//! chunks already submitted stay committed, the rest are abandoned.

use crate::error::SeedError;
use crate::store::HealthStore;
use crate::types::SeedRecord;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of one chunked insert run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub records_committed: usize,
    pub chunks_committed: usize,
    /// True when the run stopped early because the token was cancelled
    pub cancelled: bool,
}

/// Insert `records` in chunks of `chunk_size`.
///
/// For `N` records this issues `ceil(N / K)` store calls: the first
/// `floor(N / K)` of size `K`, the last of size `N mod K` (or `K` when it
/// divides evenly). Empty input returns immediately without touching the
/// store.
pub async fn insert_chunked<S: HealthStore + ?Sized>(
    store: &S,
    records: &[SeedRecord],
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<InsertSummary, SeedError> {
    if chunk_size == 0 {
        return Err(SeedError::InvalidConfig(
            "chunk_size must be at least 1".to_string(),
        ));
    }

    let mut summary = InsertSummary {
        records_committed: 0,
        chunks_committed: 0,
        cancelled: false,
    };

    for chunk in records.chunks(chunk_size) {
        if cancel.is_cancelled() {
            info!(
                committed = summary.records_committed,
                "insert run cancelled, abandoning remaining chunks"
            );
            summary.cancelled = true;
            return Ok(summary);
        }

        store.insert_records(chunk).await.map_err(|source| {
            SeedError::StoreFailure {
                committed: summary.records_committed,
                source,
            }
        })?;

        summary.records_committed += chunk.len();
        summary.chunks_committed += 1;
        debug!(
            chunk = summary.chunks_committed,
            records = chunk.len(),
            "chunk committed"
        );
    }

    Ok(summary)
}
