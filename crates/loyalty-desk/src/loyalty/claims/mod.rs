//! Claim intake: the point-balance composer, the claim service, and the
//! HTTP surface the back-office screens talk to.
//!
//! Composition is deliberately split in two. The composer half
//! ([`composer`]) is pure client-session logic: it labels rewards as
//! affordable or not and refuses obviously broken submissions before any
//! network traffic. The service half ([`service`]) owns the authoritative
//! decision: every submit re-resolves the customer and rewards and re-runs
//! the same validator against fresh state.

pub mod composer;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use composer::{
    available_points, can_afford, validate, AddOutcome, ClaimDraft, RewardCart, SubmissionError,
};
pub use domain::{
    ClaimId, ClaimRecord, ClaimStatus, ClaimSubmission, CustomerId, CustomerSnapshot, Reward,
    RewardId,
};
pub use repository::{
    ClaimHistoryQuery, ClaimRepository, ClaimView, CustomerDirectory, Page, PageRequest,
    RepositoryError, RewardCatalog,
};
pub use router::{claims_router, ClaimsApi, OPERATOR_TOKEN_HEADER};
pub use service::{ClaimService, ClaimServiceError};
