//! Persisted per-identifier request history.

use serde::{Deserialize, Serialize};

/// Accepted-request timestamps for one identifier.
///
/// Entries older than the window are not removed when they expire; they are
/// dropped the next time the record is read by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// The rate-limit key, e.g. `IP_10.0.0.1`
    pub identifier: String,
    /// Epoch milliseconds of each accepted request, oldest first
    pub timestamps: Vec<i64>,
    /// Epoch milliseconds of the last write
    pub updated_at: i64,
}

impl RateRecord {
    /// A record with no history yet.
    pub fn empty(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            timestamps: Vec::new(),
            updated_at: 0,
        }
    }

    /// Key under which the record for `identifier` is stored.
    pub fn storage_key(identifier: &str) -> String {
        format!("RATELIMIT#{}", identifier)
    }

    /// Drop every timestamp that is not strictly after `window_start`.
    pub fn prune(&mut self, window_start: i64) {
        self.timestamps.retain(|&ts| ts > window_start);
    }

    /// Record an accepted request at `now`.
    pub fn push(&mut self, now: i64) {
        self.timestamps.push(now);
        self.updated_at = now;
    }

    pub fn count(&self) -> usize {
        self.timestamps.len()
    }
}
