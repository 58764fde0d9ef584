use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::loyalty::session::RequestContext;

use super::composer::{validate, RewardCart, SubmissionError};
use super::domain::{
    ClaimId, ClaimRecord, ClaimStatus, ClaimSubmission, CustomerId, CustomerSnapshot, Reward,
    RewardId,
};
use super::repository::{
    ClaimHistoryQuery, ClaimRepository, CustomerDirectory, Page, PageRequest, RepositoryError,
    RewardCatalog,
};

/// Service composing the customer directory, reward catalog, and claim
/// store behind the claims API.
///
/// This is the authoritative half of the claim flow: whatever the composer
/// screen concluded from its cached snapshot, `submit` re-resolves the
/// customer and every reward and re-runs the submission validator before
/// anything is persisted.
pub struct ClaimService<D, C, S> {
    directory: Arc<D>,
    catalog: Arc<C>,
    claims: Arc<S>,
}

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_id() -> ClaimId {
    let id = CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClaimId(format!("clm-{id:06}"))
}

impl<D, C, S> ClaimService<D, C, S>
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    pub fn new(directory: Arc<D>, catalog: Arc<C>, claims: Arc<S>) -> Self {
        Self {
            directory,
            catalog,
            claims,
        }
    }

    /// Customer autocomplete backing the claim screen.
    pub fn search_customers(
        &self,
        request: &PageRequest,
    ) -> Result<Page<CustomerSnapshot>, ClaimServiceError> {
        Ok(self.directory.search(request)?)
    }

    /// Reward autocomplete. The composer path asks for active entries only;
    /// catalog maintenance screens may include inactive ones.
    pub fn search_rewards(
        &self,
        request: &PageRequest,
        include_inactive: bool,
    ) -> Result<Page<Reward>, ClaimServiceError> {
        Ok(self.catalog.search(request, include_inactive)?)
    }

    /// Persist a claim.
    ///
    /// The submitted payload is advisory. The customer and every reward are
    /// re-resolved here, inactive rewards are rejected, and the submission
    /// validator runs against the authoritative snapshot. On success the
    /// customer's used-points counter is debited and the claim stored.
    pub fn submit(
        &self,
        context: &RequestContext,
        submission: ClaimSubmission,
    ) -> Result<ClaimRecord, ClaimServiceError> {
        let customer = self
            .directory
            .fetch(submission.customer_id)?
            .ok_or(ClaimServiceError::UnknownCustomer(submission.customer_id))?;

        let mut cart = RewardCart::new();
        for reward_id in &submission.reward_ids {
            let reward = self
                .catalog
                .fetch(*reward_id)?
                .ok_or(ClaimServiceError::UnknownReward(*reward_id))?;
            if !reward.is_active {
                return Err(ClaimServiceError::InactiveReward(*reward_id));
            }
            cart.push(reward);
        }

        let payload = validate(Some(&customer), &cart, submission.remarks.as_deref())?;
        let points_used = cart.total_cost();

        let record = ClaimRecord {
            id: next_claim_id(),
            customer_id: payload.customer_id,
            reward_ids: payload.reward_ids,
            points_used,
            remarks: payload.remarks,
            filed_by: context.operator.clone(),
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
        };

        self.directory.record_usage(customer.id, points_used)?;
        let stored = self.claims.insert(record)?;
        Ok(stored)
    }

    /// Claim history for the admin table, newest first.
    pub fn history(
        &self,
        query: &ClaimHistoryQuery,
    ) -> Result<Page<ClaimRecord>, ClaimServiceError> {
        Ok(self.claims.page(query)?)
    }

    /// Single-claim lookup.
    pub fn get(&self, id: &ClaimId) -> Result<ClaimRecord, ClaimServiceError> {
        let record = self
            .claims
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the claim service.
#[derive(Debug, thiserror::Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    Validation(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("customer {0} not found")]
    UnknownCustomer(CustomerId),
    #[error("reward {0} not found")]
    UnknownReward(RewardId),
    #[error("reward {0} is not redeemable")]
    InactiveReward(RewardId),
}
