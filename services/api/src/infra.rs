use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;

use loyalty_desk::loyalty::claims::{
    ClaimHistoryQuery, ClaimId, ClaimRecord, ClaimRepository, CustomerDirectory, CustomerId,
    CustomerSnapshot, Page, PageRequest, RepositoryError, Reward, RewardCatalog, RewardId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerDirectory {
    customers: Arc<Mutex<HashMap<CustomerId, CustomerSnapshot>>>,
}

impl InMemoryCustomerDirectory {
    pub(crate) fn seeded(customers: Vec<CustomerSnapshot>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory
                .customers
                .lock()
                .expect("directory mutex poisoned");
            for snapshot in customers {
                guard.insert(snapshot.id, snapshot);
            }
        }
        directory
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryRewardCatalog {
    rewards: Arc<Mutex<HashMap<RewardId, Reward>>>,
}

impl InMemoryRewardCatalog {
    pub(crate) fn seeded(rewards: Vec<Reward>) -> Self {
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

impl RewardCatalog for InMemoryRewardCatalog {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryClaimStore {
    records: Arc<Mutex<Vec<ClaimRecord>>>,
}

impl ClaimRepository for InMemoryClaimStore {
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

fn member_since(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

/// Walk-up data so the service is demonstrable without a database.
pub(crate) fn seed_customers() -> Vec<CustomerSnapshot> {
    vec![
        CustomerSnapshot {
            id: CustomerId(1),
            name: "Marisol Vega".to_string(),
            phone: Some("555-0114".to_string()),
            total_earned_points: 500,
            total_referral_points: 100,
            total_used_points: 200,
            member_since: member_since(2022, 11, 3),
        },
        CustomerSnapshot {
            id: CustomerId(2),
            name: "Jonah Brandt".to_string(),
            phone: Some("555-0187".to_string()),
            total_earned_points: 120,
            total_referral_points: 0,
            total_used_points: 40,
            member_since: member_since(2024, 2, 19),
        },
        CustomerSnapshot {
            id: CustomerId(3),
            name: "Priya Natarajan".to_string(),
            phone: None,
            total_earned_points: 940,
            total_referral_points: 260,
            total_used_points: 310,
            member_since: member_since(2021, 7, 28),
        },
    ]
}

/// Fallback catalog used when no CSV is configured.
pub(crate) fn seed_rewards() -> Vec<Reward> {
    vec![
        Reward {
            id: RewardId(10),
            name: "Canvas Tote Bag".to_string(),
            required_points: 150,
            is_active: true,
        },
        Reward {
            id: RewardId(20),
            name: "Ceramic Mug".to_string(),
            required_points: 200,
            is_active: true,
        },
        Reward {
            id: RewardId(30),
            name: "Ten Dollar Gift Card".to_string(),
            required_points: 100,
            is_active: true,
        },
        Reward {
            id: RewardId(40),
            name: "Retired Keychain".to_string(),
            required_points: 25,
            is_active: false,
        },
    ]
}
