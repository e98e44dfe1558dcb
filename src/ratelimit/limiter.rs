//! Core sliding-window rate limiter.

use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use crate::store::{RateStore, StoreError};

use super::clock::{Clock, SystemClock};
use super::decision::Decision;
use super::identifier::Identifier;
use super::policy::RateLimitPolicy;
use super::record::RateRecord;

/// Sliding-window rate limiter over an injected [`RateStore`].
///
/// Every check re-reads the record from the store; nothing is cached in
/// process. The read-modify-write cycle is not atomic, so two concurrent
/// checks for the same identifier can both read the same history and the
/// later write wins, under-counting by one accepted request.
///
/// Store failures never reach the caller. They are logged and turned into a
/// permissive [`Decision`], which means a failing store disables limiting.
pub struct RateLimiter {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
    default_policy: RateLimitPolicy,
}

impl RateLimiter {
    /// Create a rate limiter on the system clock with the default policy.
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_policy: RateLimitPolicy::default(),
        }
    }

    /// Replace the policy used by [`check_default`](Self::check_default).
    pub fn with_default_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn default_policy(&self) -> RateLimitPolicy {
        self.default_policy
    }

    /// Check (and on success, count) one request for `identifier`.
    pub async fn check(&self, identifier: &Identifier, policy: RateLimitPolicy) -> Decision {
        match self.try_check(identifier, policy).await {
            Ok(decision) => decision,
            Err(e) => {
                error!(
                    identifier = %identifier,
                    error = %e,
                    "Rate limit check failed, allowing request"
                );
                Decision::fail_open(e)
            }
        }
    }

    /// Check with the configured default policy.
    pub async fn check_default(&self, identifier: &Identifier) -> Decision {
        self.check(identifier, self.default_policy).await
    }

    async fn try_check(
        &self,
        identifier: &Identifier,
        policy: RateLimitPolicy,
    ) -> Result<Decision, StoreError> {
        let now = self.clock.now_ms();
        let window_start = now.saturating_sub(policy.window_span());
        let reset_at = window_start.saturating_add(policy.window_span());
        let key = RateRecord::storage_key(identifier.as_str());

        trace!(
            identifier = %identifier,
            limit = policy.limit(),
            window_ms = policy.window_ms(),
            "Checking rate limit"
        );

        let mut record = match self.store.get(&key).await? {
            Some(record) => record,
            None => {
                debug!(identifier = %identifier, "Creating new rate record");
                RateRecord::empty(identifier.as_str())
            }
        };

        record.prune(window_start);
        let limit = policy.limit() as usize;

        if record.count() >= limit {
            warn!(
                identifier = %identifier,
                count = record.count(),
                window_ms = policy.window_ms(),
                "Rate limit exceeded"
            );
            return Ok(Decision::denied(reset_at));
        }

        record.push(now);
        let count = record.count();
        self.store.put(&key, record).await?;

        Ok(Decision::allowed((limit - count) as u64, reset_at))
    }
}
