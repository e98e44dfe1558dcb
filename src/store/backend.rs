//! Storage trait for abstracting the rate-record backing store.

use async_trait::async_trait;
use thiserror::Error;

use crate::ratelimit::RateRecord;

/// Errors raised by a backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("counter overflow under {0}")]
    Overflow(String),
}

/// Trait for rate-record stores.
///
/// Only plain get and full-replace put are required; the limiter does not
/// rely on conditional writes or atomic list operations.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Fetch the record stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<RateRecord>, StoreError>;

    /// Replace whatever is stored under `key` with `record`.
    async fn put(&self, key: &str, record: RateRecord) -> Result<(), StoreError>;
}
