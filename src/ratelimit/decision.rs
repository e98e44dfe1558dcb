//! Outcome of a single rate-limit check.

use serde::{Deserialize, Serialize};

/// Result of [`RateLimiter::check`](super::RateLimiter::check).
///
/// A fail-open decision has `allowed == true`, no quota information and the
/// store error in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub allowed: bool,
    pub remaining: Option<u64>,
    /// Epoch milliseconds at which the window of this check ends
    pub reset_at: Option<i64>,
    pub error: Option<String>,
}

impl Decision {
    pub fn allowed(remaining: u64, reset_at: i64) -> Self {
        Self {
            allowed: true,
            remaining: Some(remaining),
            reset_at: Some(reset_at),
            error: None,
        }
    }

    pub fn denied(reset_at: i64) -> Self {
        Self {
            allowed: false,
            remaining: Some(0),
            reset_at: Some(reset_at),
            error: None,
        }
    }

    pub fn fail_open(error: impl ToString) -> Self {
        Self {
            allowed: true,
            remaining: None,
            reset_at: None,
            error: Some(error.to_string()),
        }
    }

    /// True when the limiter could not reach its store and let the request through.
    pub fn is_fail_open(&self) -> bool {
        self.error.is_some()
    }
}
