//! Limit and window pair applied by a check.

use std::time::Duration;

use crate::error::{GuardError, Result};

/// How many requests an identifier may make inside a sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    limit: u32,
    window_ms: u64,
}

impl RateLimitPolicy {
    /// 30 requests...
    pub const DEFAULT_LIMIT: u32 = 30;
    /// ...per 5 minutes.
    pub const DEFAULT_WINDOW_MS: u64 = 300_000;

    /// Both values must be positive.
    pub fn new(limit: u32, window_ms: u64) -> Result<Self> {
        if limit == 0 {
            return Err(GuardError::invalid("rate limit must be positive"));
        }
        if window_ms == 0 || window_ms > i64::MAX as u64 {
            return Err(GuardError::invalid("rate limit window must be positive"));
        }
        Ok(Self { limit, window_ms })
    }

    pub fn from_duration(limit: u32, window: Duration) -> Result<Self> {
        Self::new(limit, window.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Window length on the signed epoch-millisecond axis used by records.
    pub(crate) fn window_span(&self) -> i64 {
        self.window_ms as i64
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            window_ms: Self::DEFAULT_WINDOW_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.limit(), 30);
        assert_eq!(policy.window_ms(), 300_000);
    }

    #[test]
    fn test_non_positive_values_rejected() {
        assert!(RateLimitPolicy::new(0, 1000).is_err());
        assert!(RateLimitPolicy::new(3, 0).is_err());
        assert!(RateLimitPolicy::from_duration(3, Duration::ZERO).is_err());
    }

    #[test]
    fn test_from_duration() {
        let policy = RateLimitPolicy::from_duration(5, Duration::from_secs(2)).unwrap();
        assert_eq!(policy.window_ms(), 2000);
    }
}
