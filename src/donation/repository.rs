//! Donation persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::model::{Donation, OrganizationTotals};
use crate::store::StoreError;

/// Where accepted donations and per-organization totals live.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Store a donation under `(org_id, donation_id)`, replacing any previous one.
    async fn put_donation(&self, donation: &Donation) -> Result<(), StoreError>;

    /// Add `amount` to the organization's total and bump its count by one.
    async fn increment_totals(
        &self,
        org_id: &str,
        amount: u64,
    ) -> Result<OrganizationTotals, StoreError>;

    async fn totals(&self, org_id: &str) -> Result<OrganizationTotals, StoreError>;

    /// All donations of an organization, newest first.
    async fn donations_for_org(&self, org_id: &str) -> Result<Vec<Donation>, StoreError>;
}

/// In-memory [`DonationRepository`].
#[derive(Debug, Default)]
pub struct MemoryDonationRepository {
    donations: RwLock<HashMap<String, BTreeMap<String, Donation>>>,
    totals: DashMap<String, OrganizationTotals>,
}

impl MemoryDonationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DonationRepository for MemoryDonationRepository {
    async fn put_donation(&self, donation: &Donation) -> Result<(), StoreError> {
        let mut donations = self.donations.write();
        donations
            .entry(donation.org_id.clone())
            .or_default()
            .insert(donation.donation_id.clone(), donation.clone());
        Ok(())
    }

    async fn increment_totals(
        &self,
        org_id: &str,
        amount: u64,
    ) -> Result<OrganizationTotals, StoreError> {
        let mut entry = self.totals.entry(org_id.to_string()).or_default();
        let (Some(total_donations), Some(donation_count)) = (
            entry.total_donations.checked_add(amount),
            entry.donation_count.checked_add(1),
        ) else {
            return Err(StoreError::Overflow(org_id.to_string()));
        };
        entry.total_donations = total_donations;
        entry.donation_count = donation_count;
        Ok(*entry)
    }

    async fn totals(&self, org_id: &str) -> Result<OrganizationTotals, StoreError> {
        Ok(self.totals.get(org_id).map(|t| *t).unwrap_or_default())
    }

    async fn donations_for_org(&self, org_id: &str) -> Result<Vec<Donation>, StoreError> {
        let donations = self.donations.read();
        let mut list: Vec<Donation> = donations
            .get(org_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}
