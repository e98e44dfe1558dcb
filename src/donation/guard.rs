//! Dual-key (IP + phone) submission guard.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::ratelimit::{Decision, Identifier, RateLimitPolicy, RateLimiter};

/// Both keys allowed the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub ip: Decision,
    pub phone: Decision,
}

/// At least one key denied the submission.
///
/// `reset_at` is the later of the two reset times so the caller reports the
/// longer cool-down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Too many requests. Please try again after {}. IP remaining: {}, Phone remaining: {}",
    format_reset(.reset_at),
    format_remaining(.ip_remaining),
    format_remaining(.phone_remaining)
)]
pub struct SubmissionDenied {
    pub ip_remaining: Option<u64>,
    pub phone_remaining: Option<u64>,
    pub reset_at: Option<i64>,
}

fn format_reset(reset_at: &Option<i64>) -> String {
    reset_at
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "a short while".to_string())
}

fn format_remaining(remaining: &Option<u64>) -> String {
    remaining
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Runs the same limiter under an IP key and a phone key and requires both
/// to allow. One key catches many phones behind one address, the other one
/// phone rotating through proxies.
pub struct SubmissionGuard {
    limiter: Arc<RateLimiter>,
    policy: RateLimitPolicy,
}

impl SubmissionGuard {
    pub fn new(limiter: Arc<RateLimiter>, policy: RateLimitPolicy) -> Self {
        Self { limiter, policy }
    }

    /// Check both keys. Both are always consulted, so a request denied on
    /// one key is still counted against the other when that one allows it.
    pub async fn check(&self, ip: &str, phone: &str) -> Result<GuardOutcome, SubmissionDenied> {
        let ip_decision = self.limiter.check(&Identifier::ip(ip), self.policy).await;
        let phone_decision = self
            .limiter
            .check(&Identifier::phone(phone), self.policy)
            .await;

        debug!(
            ip = %ip,
            ip_allowed = ip_decision.allowed,
            phone_allowed = phone_decision.allowed,
            "Submission guard evaluated"
        );

        if ip_decision.allowed && phone_decision.allowed {
            return Ok(GuardOutcome {
                ip: ip_decision,
                phone: phone_decision,
            });
        }

        let denied = SubmissionDenied {
            ip_remaining: ip_decision.remaining,
            phone_remaining: phone_decision.remaining,
            reset_at: ip_decision.reset_at.max(phone_decision.reset_at),
        };
        info!(ip = %ip, reset_at = ?denied.reset_at, "Submission rate limited");
        Err(denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{Clock, ManualClock, RateRecord};
    use crate::store::{MemoryRateStore, RateStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn guard(limit: u32, clock: &ManualClock) -> SubmissionGuard {
        let limiter = RateLimiter::with_clock(
            Arc::new(MemoryRateStore::new()),
            Arc::new(clock.clone()),
        );
        SubmissionGuard::new(
            Arc::new(limiter),
            RateLimitPolicy::new(limit, 60_000).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_both_keys_allow() {
        let clock = ManualClock::new(1_000);
        let guard = guard(2, &clock);

        let outcome = guard.check("10.0.0.1", "0511111111").await.unwrap();
        assert_eq!(outcome.ip.remaining, Some(1));
        assert_eq!(outcome.phone.remaining, Some(1));
    }

    #[tokio::test]
    async fn test_many_phones_behind_one_ip_denied() {
        let clock = ManualClock::new(1_000);
        let guard = guard(2, &clock);

        guard.check("10.0.0.1", "0500000001").await.unwrap();
        guard.check("10.0.0.1", "0500000002").await.unwrap();
        let denied = guard.check("10.0.0.1", "0500000003").await.unwrap_err();

        assert_eq!(denied.ip_remaining, Some(0));
        assert_eq!(denied.phone_remaining, Some(1));
    }

    #[tokio::test]
    async fn test_one_phone_across_many_ips_denied() {
        let clock = ManualClock::new(1_000);
        let guard = guard(1, &clock);

        guard.check("10.0.0.1", "0500000001").await.unwrap();
        clock.advance(5);
        let denied = guard.check("10.0.0.2", "0500000001").await.unwrap_err();

        assert_eq!(denied.ip_remaining, Some(0));
        assert_eq!(denied.phone_remaining, Some(0));
        assert_eq!(denied.reset_at, Some(1_005));
    }

    /// Clock that moves forward by `step` every time it is read.
    struct SteppingClock {
        now: AtomicI64,
        step: i64,
    }

    impl Clock for SteppingClock {
        fn now_ms(&self) -> i64 {
            self.now.fetch_add(self.step, Ordering::SeqCst)
        }
    }

    /// Store whose phone-keyed reads always fail.
    struct PhoneOutageStore {
        inner: MemoryRateStore,
    }

    #[async_trait]
    impl RateStore for PhoneOutageStore {
        async fn get(&self, key: &str) -> Result<Option<RateRecord>, StoreError> {
            if key.contains("PHONE_") {
                return Err(StoreError::Unavailable("phone partition offline".to_string()));
            }
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, record: RateRecord) -> Result<(), StoreError> {
            self.inner.put(key, record).await
        }
    }

    #[tokio::test]
    async fn test_denied_reports_later_reset() {
        let clock = Arc::new(SteppingClock {
            now: AtomicI64::new(1_000),
            step: 10,
        });
        let limiter = RateLimiter::with_clock(Arc::new(MemoryRateStore::new()), clock);
        let guard = SubmissionGuard::new(
            Arc::new(limiter),
            RateLimitPolicy::new(1, 60_000).unwrap(),
        );

        // ip read at 1_000, phone at 1_010
        guard.check("10.0.0.1", "0500000001").await.unwrap();
        // ip read at 1_020, phone at 1_030
        let denied = guard.check("10.0.0.1", "0500000001").await.unwrap_err();

        assert_eq!(denied.ip_remaining, Some(0));
        assert_eq!(denied.phone_remaining, Some(0));
        assert_eq!(denied.reset_at, Some(1_030));
    }

    #[tokio::test]
    async fn test_denied_with_other_key_failed_open() {
        let clock = ManualClock::new(1_000);
        let limiter = RateLimiter::with_clock(
            Arc::new(PhoneOutageStore {
                inner: MemoryRateStore::new(),
            }),
            Arc::new(clock.clone()),
        );
        let guard = SubmissionGuard::new(
            Arc::new(limiter),
            RateLimitPolicy::new(1, 60_000).unwrap(),
        );

        let outcome = guard.check("10.0.0.1", "0500000001").await.unwrap();
        assert!(outcome.phone.is_fail_open());

        clock.advance(5);
        let denied = guard.check("10.0.0.1", "0500000001").await.unwrap_err();
        assert_eq!(denied.ip_remaining, Some(0));
        assert_eq!(denied.phone_remaining, None);
        assert_eq!(denied.reset_at, Some(1_005));
        assert!(denied.to_string().ends_with("IP remaining: 0, Phone remaining: unknown"));
    }

    #[test]
    fn test_denied_message() {
        let denied = SubmissionDenied {
            ip_remaining: Some(0),
            phone_remaining: None,
            reset_at: Some(3_723_000),
        };
        assert_eq!(
            denied.to_string(),
            "Too many requests. Please try again after 01:02:03 UTC. IP remaining: 0, Phone remaining: unknown"
        );
    }
}
