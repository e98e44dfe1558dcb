//! Suspicious-activity report over recent donations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use super::model::Donation;

/// Thresholds for [`find_suspicious`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Only donations younger than this are considered
    pub time_window: Duration,
    /// A client address with more donations than this is reported
    pub max_per_ip: usize,
    /// A phone number with more donations than this is reported
    pub max_per_phone: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            time_window: Duration::from_secs(3600),
            max_per_ip: 10,
            max_per_phone: 5,
        }
    }
}

/// Donations sharing one IP or one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousGroup {
    pub key: String,
    pub count: usize,
    pub donation_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousReport {
    pub by_ip: Vec<SuspiciousGroup>,
    pub by_phone: Vec<SuspiciousGroup>,
}

impl SuspiciousReport {
    pub fn is_empty(&self) -> bool {
        self.by_ip.is_empty() && self.by_phone.is_empty()
    }
}

/// Group the donations made within `options.time_window` of `now` by IP and
/// by phone, keeping groups strictly over their threshold.
pub fn find_suspicious(
    donations: &[Donation],
    options: &AuditOptions,
    now: DateTime<Utc>,
) -> SuspiciousReport {
    let window_ms = options.time_window.as_millis().min(i64::MAX as u128) as i64;
    let recent: Vec<&Donation> = donations
        .iter()
        .filter(|d| (now - d.created_at).num_milliseconds() < window_ms)
        .collect();

    SuspiciousReport {
        by_ip: over_threshold(&recent, |d| &d.metadata.ip, options.max_per_ip),
        by_phone: over_threshold(&recent, |d| &d.phone_number, options.max_per_phone),
    }
}

fn over_threshold<'a, F>(donations: &[&'a Donation], key: F, max: usize) -> Vec<SuspiciousGroup>
where
    F: Fn(&'a Donation) -> &'a String,
{
    let mut groups: HashMap<&'a str, Vec<&'a Donation>> = HashMap::new();
    for &donation in donations {
        groups.entry(key(donation).as_str()).or_default().push(donation);
    }

    let mut flagged: Vec<SuspiciousGroup> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > max)
        .map(|(key, members)| SuspiciousGroup {
            key: key.to_string(),
            count: members.len(),
            donation_ids: members.iter().map(|d| d.donation_id.clone()).collect(),
        })
        .collect();

    flagged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    flagged
}
