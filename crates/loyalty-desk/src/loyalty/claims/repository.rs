use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ClaimId, ClaimRecord, ClaimStatus, CustomerId, CustomerSnapshot, Reward, RewardId,
};

pub const DEFAULT_PER_PAGE: u32 = 15;
const MAX_PER_PAGE: u32 = 100;

/// Paging and free-text filter shared by the directory, catalog, and claim
/// history queries. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn with_search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    /// Effective page size after clamping to 1..=100.
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size())
    }

    /// Lowercased needle, if a non-empty search was given.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }
}

/// One page of results plus the counters the table screens page with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Slice an already-filtered, already-ordered match list down to the
    /// requested page.
    pub fn from_matches(request: &PageRequest, matches: Vec<T>) -> Self {
        let total = matches.len() as u64;
        let size = request.page_size();
        let items = matches
            .into_iter()
            .skip(request.offset() as usize)
            .take(size as usize)
            .collect();

        Self {
            items,
            page: request.page.max(1),
            per_page: size,
            total,
        }
    }
}

/// Claim-history filter: paging plus an optional status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimHistoryQuery {
    pub page: PageRequest,
    pub status: Option<ClaimStatus>,
}

/// Directory of customers and their point counters.
pub trait CustomerDirectory: Send + Sync {
    fn search(&self, request: &PageRequest) -> Result<Page<CustomerSnapshot>, RepositoryError>;
    fn fetch(&self, id: CustomerId) -> Result<Option<CustomerSnapshot>, RepositoryError>;
    /// Add `points` to the customer's used-points counter and return the
    /// refreshed snapshot.
    fn record_usage(&self, id: CustomerId, points: u32)
        -> Result<CustomerSnapshot, RepositoryError>;
}

/// Reward catalog lookups.
pub trait RewardCatalog: Send + Sync {
    fn search(
        &self,
        request: &PageRequest,
        include_inactive: bool,
    ) -> Result<Page<Reward>, RepositoryError>;
    fn fetch(&self, id: RewardId) -> Result<Option<Reward>, RepositoryError>;
}

/// Claim persistence.
pub trait ClaimRepository: Send + Sync {
    fn insert(&self, record: ClaimRecord) -> Result<ClaimRecord, RepositoryError>;
    fn fetch(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError>;
    /// Newest-first history page.
    fn page(&self, query: &ClaimHistoryQuery) -> Result<Page<ClaimRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Wire representation of a claim for table rows and submit responses.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    pub id: ClaimId,
    pub customer_id: CustomerId,
    pub reward_ids: Vec<RewardId>,
    pub points_used: u32,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub filed_by: String,
    pub created_at: DateTime<Utc>,
}

impl ClaimRecord {
    pub fn view(&self) -> ClaimView {
        ClaimView {
            id: self.id.clone(),
            customer_id: self.customer_id,
            reward_ids: self.reward_ids.clone(),
            points_used: self.points_used,
            status: self.status.label(),
            remarks: self.remarks.clone(),
            filed_by: self.filed_by.clone(),
            created_at: self.created_at,
        }
    }
}
