//! In-process rate-record store.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use super::backend::{RateStore, StoreError};
use crate::ratelimit::RateRecord;

/// A [`RateStore`] kept in a sharded concurrent map.
///
/// Records are never expired, matching a document store without TTL.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    records: DashMap<String, RateRecord>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clear all records.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.records.clear();
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get(&self, key: &str) -> Result<Option<RateRecord>, StoreError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, record: RateRecord) -> Result<(), StoreError> {
        trace!(key = %key, entries = record.timestamps.len(), "Writing rate record");
        self.records.insert(key.to_string(), record);
        Ok(())
    }
}
