use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::loyalty::claims::domain::{
    ClaimId, ClaimRecord, CustomerId, CustomerSnapshot, Reward, RewardId,
};
use crate::loyalty::claims::repository::{
    ClaimHistoryQuery, ClaimRepository, CustomerDirectory, Page, PageRequest, RepositoryError,
    RewardCatalog,
};
use crate::loyalty::claims::router::{claims_router, ClaimsApi};
use crate::loyalty::claims::service::ClaimService;
use crate::loyalty::session::{RequestContext, Role, SessionProvider};

pub(super) const OPERATOR_TOKEN: &str = "test-operator-token";
pub(super) const VIEWER_TOKEN: &str = "test-viewer-token";

pub(super) fn customer(id: u64, earned: u32, referral: u32, used: u32) -> CustomerSnapshot {
    CustomerSnapshot {
        id: CustomerId(id),
        name: format!("Customer {id}"),
        phone: Some(format!("555-01{id:02}")),
        total_earned_points: earned,
        total_referral_points: referral,
        total_used_points: used,
        member_since: NaiveDate::from_ymd_opt(2024, 3, 11).expect("valid date"),
    }
}

/// The worked example from the claim screen: 500 earned, 100 referral, 200
/// used, so 400 available.
pub(super) fn flagship_customer() -> CustomerSnapshot {
    customer(1, 500, 100, 200)
}

pub(super) fn reward(id: u64, required_points: u32) -> Reward {
    Reward {
        id: RewardId(id),
        name: format!("Reward {id}"),
        required_points,
        is_active: true,
    }
}

pub(super) fn inactive_reward(id: u64, required_points: u32) -> Reward {
    Reward {
        is_active: false,
        ..reward(id, required_points)
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    customers: Mutex<HashMap<CustomerId, CustomerSnapshot>>,
}

impl MemoryDirectory {
    pub(super) fn with_customers(customers: Vec<CustomerSnapshot>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory.customers.lock().expect("directory mutex poisoned");
            for snapshot in customers {
                guard.insert(snapshot.id, snapshot);
            }
        }
        directory
    }
}

impl CustomerDirectory for MemoryDirectory {
    fn search(&self, request: &PageRequest) -> Result<Page<CustomerSnapshot>, RepositoryError> {
        let guard = self.customers.lock().expect("directory mutex poisoned");
        let needle = request.needle();
        let mut matches: Vec<_> = guard
            .values()
            .filter(|snapshot| match &needle {
                Some(needle) => {
                    snapshot.name.to_lowercase().contains(needle)
                        || snapshot
                            .phone
                            .as_deref()
                            .is_some_and(|phone| phone.contains(needle.as_str()))
                }
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by_key(|snapshot| snapshot.id);
        Ok(Page::from_matches(request, matches))
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<CustomerSnapshot>, RepositoryError> {
        let guard = self.customers.lock().expect("directory mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn record_usage(
        &self,
        id: CustomerId,
        points: u32,
    ) -> Result<CustomerSnapshot, RepositoryError> {
        let mut guard = self.customers.lock().expect("directory mutex poisoned");
        let snapshot = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        snapshot.total_used_points += points;
        Ok(snapshot.clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    rewards: Mutex<HashMap<RewardId, Reward>>,
}

impl MemoryCatalog {
    pub(super) fn with_rewards(rewards: Vec<Reward>) -> Self {
        let catalog = Self::default();
        {
            let mut guard = catalog.rewards.lock().expect("catalog mutex poisoned");
            for entry in rewards {
                guard.insert(entry.id, entry);
            }
        }
        catalog
    }
}

impl RewardCatalog for MemoryCatalog {
    fn search(
        &self,
        request: &PageRequest,
        include_inactive: bool,
    ) -> Result<Page<Reward>, RepositoryError> {
        let guard = self.rewards.lock().expect("catalog mutex poisoned");
        let needle = request.needle();
        let mut matches: Vec<_> = guard
            .values()
            .filter(|entry| include_inactive || entry.is_active)
            .filter(|entry| match &needle {
                Some(needle) => entry.name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by_key(|entry| entry.id);
        Ok(Page::from_matches(request, matches))
    }

    fn fetch(&self, id: RewardId) -> Result<Option<Reward>, RepositoryError> {
        let guard = self.rewards.lock().expect("catalog mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryClaims {
    records: Mutex<Vec<ClaimRecord>>,
}

impl MemoryClaims {
    pub(super) fn records(&self) -> Vec<ClaimRecord> {
        self.records.lock().expect("claims mutex poisoned").clone()
    }
}

impl ClaimRepository for MemoryClaims {
    fn insert(&self, record: ClaimRecord) -> Result<ClaimRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("claims mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError> {
        let guard = self.records.lock().expect("claims mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn page(&self, query: &ClaimHistoryQuery) -> Result<Page<ClaimRecord>, RepositoryError> {
        let guard = self.records.lock().expect("claims mutex poisoned");
        let needle = query.page.needle();
        let matches: Vec<_> = guard
            .iter()
            .rev()
            .filter(|record| match query.status {
                Some(status) => record.status == status,
                None => true,
            })
            .filter(|record| match &needle {
                Some(needle) => {
                    record.id.0.to_lowercase().contains(needle)
                        || record
                            .remarks
                            .as_deref()
                            .is_some_and(|remarks| remarks.to_lowercase().contains(needle))
                }
                None => true,
            })
            .cloned()
            .collect();
        Ok(Page::from_matches(&query.page, matches))
    }
}

/// Claim store that fails every operation, for error-path assertions.
pub(super) struct UnavailableClaims;

impl ClaimRepository for UnavailableClaims {
    fn insert(&self, _record: ClaimRecord) -> Result<ClaimRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("claims store offline".to_string()))
    }

    fn fetch(&self, _id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("claims store offline".to_string()))
    }

    fn page(&self, _query: &ClaimHistoryQuery) -> Result<Page<ClaimRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("claims store offline".to_string()))
    }
}

pub(super) fn seeded_rewards() -> Vec<Reward> {
    vec![
        reward(10, 150),
        reward(20, 200),
        reward(30, 100),
        inactive_reward(40, 25),
    ]
}

pub(super) fn build_service() -> (
    ClaimService<MemoryDirectory, MemoryCatalog, MemoryClaims>,
    Arc<MemoryDirectory>,
    Arc<MemoryCatalog>,
    Arc<MemoryClaims>,
) {
    let directory = Arc::new(MemoryDirectory::with_customers(vec![
        flagship_customer(),
        customer(2, 80, 0, 0),
    ]));
    let catalog = Arc::new(MemoryCatalog::with_rewards(seeded_rewards()));
    let claims = Arc::new(MemoryClaims::default());
    let service = ClaimService::new(directory.clone(), catalog.clone(), claims.clone());
    (service, directory, catalog, claims)
}

pub(super) fn operator_context() -> RequestContext {
    RequestContext {
        operator: "Dana".to_string(),
        role: Role::Staff,
        issued_at: chrono::Utc::now(),
    }
}

pub(super) fn session_provider() -> Arc<SessionProvider> {
    let sessions = Arc::new(SessionProvider::new());
    sessions.issue(OPERATOR_TOKEN, "Dana", Role::Staff);
    sessions.issue(VIEWER_TOKEN, "Sasha", Role::Viewer);
    sessions
}

pub(super) fn claims_api(
    service: ClaimService<MemoryDirectory, MemoryCatalog, MemoryClaims>,
) -> ClaimsApi<MemoryDirectory, MemoryCatalog, MemoryClaims> {
    ClaimsApi {
        service: Arc::new(service),
        sessions: session_provider(),
    }
}

pub(super) fn router_with_service(
    service: ClaimService<MemoryDirectory, MemoryCatalog, MemoryClaims>,
) -> axum::Router {
    claims_router(claims_api(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
