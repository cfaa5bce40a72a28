//! In-memory dedup store. Lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::DedupKey;
use crate::error::Result;
use crate::port::DedupStore;

/// Dedup store backed by a concurrent map of key to record time.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    records: DashMap<DedupKey, DateTime<Utc>>,
}

impl InMemoryDedupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every record.
    pub fn clear(&self) {
        self.records.clear();
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn is_new(&self, key: &DedupKey) -> Result<bool> {
        Ok(!self.records.contains_key(key))
    }

    async fn record_at(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()> {
        self.records.entry(key.clone()).or_insert(at);
        Ok(())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|_, recorded_at| *recorded_at >= cutoff);
        Ok(before.saturating_sub(self.records.len()))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
