//! Dedup store port.
//!
//! The store is the single source of truth for "already announced". Two
//! backends implement it: an in-memory map and a SQLite table.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::DedupKey;
use crate::error::{ConfigError, Result};

/// Tracks which dedup keys have already been announced.
///
/// # Contract
///
/// - `record` is idempotent: recording a present key keeps the original
///   timestamp.
/// - After `record(k)`, `is_new(k)` returns `false` until a purge removes
///   the record.
/// - `purge_older_than(r)` removes exactly the records with
///   `now - recorded_at > r`.
///
/// Callers that check and then record must serialize that sequence
/// themselves; the store gives no compare-and-set.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// `true` if `key` has never been recorded (or its record was purged).
    async fn is_new(&self, key: &DedupKey) -> Result<bool>;

    /// Record `key` as announced at `at`. No-op if already present.
    async fn record_at(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()>;

    /// Delete records with `recorded_at < cutoff`. Returns the number removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Number of records currently held.
    async fn len(&self) -> Result<usize>;

    /// Record `key` as announced now.
    async fn record(&self, key: &DedupKey) -> Result<()> {
        self.record_at(key, Utc::now()).await
    }

    /// Delete records older than `retention`. Returns the number removed.
    ///
    /// Fails without touching the store if `now - retention` is not a
    /// representable instant.
    async fn purge_older_than(&self, retention: Duration) -> Result<usize> {
        let cutoff = Utc::now().checked_sub_signed(retention).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "retention_hours",
                reason: format!(
                    "{} hours reaches past the earliest timestamp",
                    retention.num_hours()
                ),
            }
        })?;
        self.purge_before(cutoff).await
    }

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}
