//! DonationGuard service implementation.

use std::sync::Arc;
use std::time::Duration;
use tonic::{Request, Response, Status};
use tracing::{debug, info, instrument, warn};

use super::messages::{
    CheckRateLimitRequest, CheckRateLimitResponse, FindSuspiciousRequest, FindSuspiciousResponse,
    SubmitDonationRequest, SubmitDonationResponse, SuspiciousGroup,
};
use super::proto::donation_guard_server::DonationGuard;
use crate::donation::{self, AuditOptions, DonationRequest, DonationService, RequestMetadata};
use crate::error::GuardError;
use crate::ratelimit::{Identifier, RateLimitPolicy, RateLimiter};

impl From<GuardError> for Status {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::InvalidInput(msg) => Status::invalid_argument(msg),
            GuardError::RateLimited(denied) => Status::resource_exhausted(denied.to_string()),
            GuardError::Repository(e) => Status::unavailable(e.to_string()),
            other => Status::internal(other.to_string()),
        }
    }
}

/// Implementation of the DonationGuard gRPC interface.
pub struct DonationGuardService {
    limiter: Arc<RateLimiter>,
    donations: Arc<DonationService>,
    audit: AuditOptions,
}

impl DonationGuardService {
    pub fn new(
        limiter: Arc<RateLimiter>,
        donations: Arc<DonationService>,
        audit: AuditOptions,
    ) -> Self {
        Self {
            limiter,
            donations,
            audit,
        }
    }
}

fn group_to_proto(group: donation::SuspiciousGroup) -> SuspiciousGroup {
    SuspiciousGroup {
        key: group.key,
        count: group.count.min(u32::MAX as usize) as u32,
        donation_ids: group.donation_ids,
    }
}

#[tonic::async_trait]
impl DonationGuard for DonationGuardService {
    /// Check a single identifier, counting the request when allowed.
    #[instrument(
        skip(self, request),
        fields(identifier = %request.get_ref().identifier)
    )]
    async fn check_rate_limit(
        &self,
        request: Request<CheckRateLimitRequest>,
    ) -> Result<Response<CheckRateLimitResponse>, Status> {
        let req = request.into_inner();

        let identifier = Identifier::new(req.identifier).map_err(|e| {
            warn!("Received rate limit check with empty identifier");
            Status::from(e)
        })?;

        let defaults = self.limiter.default_policy();
        let limit = if req.limit == 0 { defaults.limit() } else { req.limit };
        let window_ms = if req.window_ms == 0 {
            defaults.window_ms()
        } else {
            req.window_ms
        };
        let policy = RateLimitPolicy::new(limit, window_ms)?;

        let decision = self.limiter.check(&identifier, policy).await;
        debug!(allowed = decision.allowed, remaining = ?decision.remaining, "Rate limit decision made");

        Ok(Response::new(CheckRateLimitResponse {
            allowed: decision.allowed,
            remaining: decision.remaining,
            reset_at: decision.reset_at,
            error: decision.error,
        }))
    }

    /// Validate, rate limit and persist a public donation.
    #[instrument(
        skip(self, request),
        fields(org_id = %request.get_ref().org_id, amount = request.get_ref().amount)
    )]
    async fn submit_donation(
        &self,
        request: Request<SubmitDonationRequest>,
    ) -> Result<Response<SubmitDonationResponse>, Status> {
        let req = request.into_inner();

        let metadata = RequestMetadata::new(
            req.ip.as_deref(),
            req.user_agent.as_deref(),
            req.origin.as_deref(),
            req.referer.as_deref(),
        );
        let donation_request = DonationRequest {
            org_id: req.org_id,
            name: req.name,
            phone_number: req.phone_number,
            amount: req.amount,
        };

        let donation = self
            .donations
            .submit(donation_request, metadata)
            .await
            .map_err(|e| {
                info!(error = %e, "Donation rejected");
                Status::from(e)
            })?;

        Ok(Response::new(SubmitDonationResponse {
            donation_id: donation.donation_id,
            created_at: donation.created_at.to_rfc3339(),
        }))
    }

    /// Report addresses and phone numbers with unusually many recent donations.
    #[instrument(skip(self, request), fields(org_id = %request.get_ref().org_id))]
    async fn find_suspicious_donations(
        &self,
        request: Request<FindSuspiciousRequest>,
    ) -> Result<Response<FindSuspiciousResponse>, Status> {
        let req = request.into_inner();
        if req.org_id.is_empty() {
            return Err(Status::invalid_argument("org_id is required"));
        }

        let mut options = self.audit.clone();
        if let Some(ms) = req.time_window_ms {
            options.time_window = Duration::from_millis(ms);
        }
        if let Some(max) = req.max_per_ip {
            options.max_per_ip = max as usize;
        }
        if let Some(max) = req.max_per_phone {
            options.max_per_phone = max as usize;
        }

        let report = self.donations.find_suspicious(&req.org_id, &options).await?;

        Ok(Response::new(FindSuspiciousResponse {
            by_ip: report.by_ip.into_iter().map(group_to_proto).collect(),
            by_phone: report.by_phone.into_iter().map(group_to_proto).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donation::{MemoryDonationRepository, SubmissionGuard};
    use crate::ratelimit::ManualClock;
    use crate::store::MemoryRateStore;

    fn service(limit: u32) -> (DonationGuardService, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let policy = RateLimitPolicy::new(limit, 300_000).unwrap();
        let limiter = Arc::new(
            RateLimiter::with_clock(Arc::new(MemoryRateStore::new()), Arc::new(clock.clone()))
                .with_default_policy(policy),
        );
        let donations = Arc::new(DonationService::new(
            SubmissionGuard::new(limiter.clone(), policy),
            Arc::new(MemoryDonationRepository::new()),
            Arc::new(clock.clone()),
        ));
        (
            DonationGuardService::new(limiter, donations, AuditOptions::default()),
            clock,
        )
    }

    fn submission(phone: &str, ip: &str) -> Request<SubmitDonationRequest> {
        Request::new(SubmitDonationRequest {
            org_id: "org-1".to_string(),
            name: None,
            phone_number: phone.to_string(),
            amount: 100,
            ip: Some(ip.to_string()),
            user_agent: None,
            origin: None,
            referer: None,
        })
    }

    #[tokio::test]
    async fn test_empty_identifier_rejected() {
        let (service, _) = service(30);

        let request = Request::new(CheckRateLimitRequest {
            identifier: String::new(),
            limit: 0,
            window_ms: 0,
        });

        let result = service.check_rate_limit(request).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_check_uses_default_policy() {
        let (service, _) = service(3);

        let request = Request::new(CheckRateLimitRequest {
            identifier: "IP_10.0.0.1".to_string(),
            limit: 0,
            window_ms: 0,
        });

        let response = service.check_rate_limit(request).await.unwrap().into_inner();
        assert!(response.allowed);
        assert_eq!(response.remaining, Some(2));
        assert_eq!(response.reset_at, Some(1_700_000_000_000));
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_check_with_override() {
        let (service, _) = service(30);

        let check = || {
            Request::new(CheckRateLimitRequest {
                identifier: "PHONE_0500000000".to_string(),
                limit: 2,
                window_ms: 1000,
            })
        };

        for _ in 0..2 {
            let response = service.check_rate_limit(check()).await.unwrap().into_inner();
            assert!(response.allowed);
        }

        let response = service.check_rate_limit(check()).await.unwrap().into_inner();
        assert!(!response.allowed);
        assert_eq!(response.remaining, Some(0));
    }

    #[tokio::test]
    async fn test_submit_donation() {
        let (service, _) = service(30);

        let response = service
            .submit_donation(submission("0512345678", "10.0.0.1"))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.donation_id, "DONATION#1700000000000");
        assert!(response.created_at.starts_with("2023-11-14T22:13:20"));
    }

    #[tokio::test]
    async fn test_submit_invalid_phone_rejected() {
        let (service, _) = service(30);

        let status = service
            .submit_donation(submission("999", "10.0.0.1"))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_submit_rate_limited() {
        let (service, clock) = service(1);

        service
            .submit_donation(submission("0512345678", "10.0.0.1"))
            .await
            .unwrap();
        clock.advance(1);

        let status = service
            .submit_donation(submission("0512345678", "10.0.0.2"))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::ResourceExhausted);
        assert!(status.message().contains("Phone remaining: 0"));
    }

    #[tokio::test]
    async fn test_find_suspicious_donations() {
        let (service, clock) = service(30);
        for phone in ["0500000001", "0500000002"] {
            clock.advance(1);
            service
                .submit_donation(submission(phone, "7.7.7.7"))
                .await
                .unwrap();
        }

        let response = service
            .find_suspicious_donations(Request::new(FindSuspiciousRequest {
                org_id: "org-1".to_string(),
                time_window_ms: None,
                max_per_ip: Some(1),
                max_per_phone: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.by_ip.len(), 1);
        assert_eq!(response.by_ip[0].key, "7.7.7.7");
        assert_eq!(response.by_ip[0].count, 2);
        assert!(response.by_phone.is_empty());
    }

    #[tokio::test]
    async fn test_find_suspicious_requires_org() {
        let (service, _) = service(30);

        let status = service
            .find_suspicious_donations(Request::new(FindSuspiciousRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }
}
