//! Donation submission workflow.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::audit::{find_suspicious, AuditOptions, SuspiciousReport};
use super::guard::SubmissionGuard;
use super::model::{Donation, DonationRequest, RequestMetadata};
use super::repository::DonationRepository;
use crate::error::Result;
use crate::ratelimit::Clock;

/// Accepts public donations: validates, rate limits on IP and phone, then
/// persists the donation and bumps the organization totals.
pub struct DonationService {
    guard: SubmissionGuard,
    repository: Arc<dyn DonationRepository>,
    clock: Arc<dyn Clock>,
}

impl DonationService {
    pub fn new(
        guard: SubmissionGuard,
        repository: Arc<dyn DonationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard,
            repository,
            clock,
        }
    }

    /// Submit one donation.
    ///
    /// Persistence failures propagate; only the limiter fails open.
    pub async fn submit(
        &self,
        request: DonationRequest,
        metadata: RequestMetadata,
    ) -> Result<Donation> {
        request.validate()?;

        let outcome = self
            .guard
            .check(&metadata.ip, &request.phone_number)
            .await?;

        let now_ms = self.clock.now_ms();
        let created_at = timestamp(now_ms);

        let donation = Donation {
            donation_id: Donation::id_for(now_ms),
            org_id: request.org_id,
            phone_number: request.phone_number,
            name: request.name,
            amount: request.amount,
            created_at,
            metadata,
            ip_rate_limit: outcome.ip,
            phone_rate_limit: outcome.phone,
        };

        self.repository.put_donation(&donation).await?;
        let totals = self
            .repository
            .increment_totals(&donation.org_id, donation.amount)
            .await?;

        info!(
            org_id = %donation.org_id,
            donation_id = %donation.donation_id,
            amount = donation.amount,
            donation_count = totals.donation_count,
            "Donation accepted"
        );

        Ok(donation)
    }

    /// Report IPs and phones with unusually many recent donations to `org_id`.
    pub async fn find_suspicious(
        &self,
        org_id: &str,
        options: &AuditOptions,
    ) -> Result<SuspiciousReport> {
        let donations = self.repository.donations_for_org(org_id).await?;
        Ok(find_suspicious(&donations, options, timestamp(self.clock.now_ms())))
    }
}

fn timestamp(epoch_ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_else(Utc::now)
}
