//! Donation submission data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::ratelimit::Decision;

const UNKNOWN: &str = "unknown";

/// Largest amount a single donation may carry.
pub const MAX_DONATION_AMOUNT: u64 = 1_000_000_000;

/// A donor's submission as received from the public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub org_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub phone_number: String,
    /// Whole currency units
    pub amount: u64,
}

impl DonationRequest {
    pub fn validate(&self) -> Result<()> {
        if self.org_id.trim().is_empty() {
            return Err(GuardError::invalid("organization id is required"));
        }
        if !is_valid_phone_number(&self.phone_number) {
            return Err(GuardError::invalid(
                "phone number must start with 05 and have 10 digits",
            ));
        }
        if self.amount == 0 {
            return Err(GuardError::invalid("donation amount must be positive"));
        }
        if self.amount > MAX_DONATION_AMOUNT {
            return Err(GuardError::invalid(format!(
                "donation amount must not exceed {}",
                MAX_DONATION_AMOUNT
            )));
        }
        Ok(())
    }
}

/// Mobile numbers are `05` followed by eight digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone.len() == 10 && phone.starts_with("05") && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Request headers captured alongside a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub ip: String,
    pub user_agent: String,
    pub origin: String,
    pub referer: String,
}

impl RequestMetadata {
    /// Missing or blank values are recorded as `unknown`.
    pub fn new(
        ip: Option<&str>,
        user_agent: Option<&str>,
        origin: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            ip: or_unknown(ip),
            user_agent: or_unknown(user_agent),
            origin: or_unknown(origin),
            referer: or_unknown(referer),
        }
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// A persisted donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub org_id: String,
    /// `DONATION#<epoch-ms>`, unique per organization
    pub donation_id: String,
    pub phone_number: String,
    pub name: Option<String>,
    pub amount: u64,
    pub created_at: DateTime<Utc>,
    pub metadata: RequestMetadata,
    /// Limiter decisions that let this donation through
    pub ip_rate_limit: Decision,
    pub phone_rate_limit: Decision,
}

impl Donation {
    pub fn id_for(epoch_ms: i64) -> String {
        format!("DONATION#{}", epoch_ms)
    }
}

/// Running aggregates kept on the organization record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationTotals {
    pub total_donations: u64,
    pub donation_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(phone: &str, amount: u64) -> DonationRequest {
        DonationRequest {
            org_id: "org-1".to_string(),
            name: None,
            phone_number: phone.to_string(),
            amount,
        }
    }

    #[test]
    fn test_phone_number_format() {
        assert!(is_valid_phone_number("0512345678"));
        assert!(!is_valid_phone_number("0612345678"));
        assert!(!is_valid_phone_number("051234567"));
        assert!(!is_valid_phone_number("05123456789"));
        assert!(!is_valid_phone_number("05123a5678"));
    }

    #[test]
    fn test_validate_request() {
        assert!(request("0512345678", 50).validate().is_ok());
        assert!(matches!(
            request("0512345678", 0).validate(),
            Err(GuardError::InvalidInput(_))
        ));
        assert!(request("12345", 50).validate().is_err());
        assert!(request("0512345678", MAX_DONATION_AMOUNT).validate().is_ok());
        assert!(matches!(
            request("0512345678", MAX_DONATION_AMOUNT + 1).validate(),
            Err(GuardError::InvalidInput(_))
        ));
        assert!(matches!(
            request("0512345678", u64::MAX).validate(),
            Err(GuardError::InvalidInput(_))
        ));

        let mut no_org = request("0512345678", 50);
        no_org.org_id = "  ".to_string();
        assert!(no_org.validate().is_err());
    }

    #[test]
    fn test_metadata_defaults_to_unknown() {
        let metadata = RequestMetadata::new(Some("10.1.1.1"), Some(""), None, Some("https://x"));
        assert_eq!(metadata.ip, "10.1.1.1");
        assert_eq!(metadata.user_agent, "unknown");
        assert_eq!(metadata.origin, "unknown");
        assert_eq!(metadata.referer, "https://x");
    }

    #[test]
    fn test_request_deserializes_from_form_json() {
        let json = r#"{"orgId":"org-7","phoneNumber":"0500000000","amount":100}"#;
        let request: DonationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.org_id, "org-7");
        assert_eq!(request.name, None);
        assert_eq!(request.amount, 100);
    }
}
