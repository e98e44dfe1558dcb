//! Public donation submission: the dual-key guard, the workflow around it
//! and the suspicious-activity report.

mod audit;
mod guard;
mod model;
mod repository;
mod service;

pub use audit::{find_suspicious, AuditOptions, SuspiciousGroup, SuspiciousReport};
pub use guard::{GuardOutcome, SubmissionDenied, SubmissionGuard};
pub use model::{
    is_valid_phone_number, Donation, DonationRequest, OrganizationTotals, RequestMetadata,
    MAX_DONATION_AMOUNT,
};
pub use repository::{DonationRepository, MemoryDonationRepository};
pub use service::DonationService;
