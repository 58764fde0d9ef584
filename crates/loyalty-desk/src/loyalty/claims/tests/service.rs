use super::common::*;
use crate::loyalty::claims::composer::SubmissionError;
use crate::loyalty::claims::domain::{
    ClaimId, ClaimStatus, ClaimSubmission, CustomerId, RewardId,
};
use crate::loyalty::claims::repository::{
    ClaimHistoryQuery, CustomerDirectory, PageRequest, RepositoryError,
};
use crate::loyalty::claims::service::{ClaimService, ClaimServiceError};
use std::sync::Arc;

fn submission(reward_ids: Vec<u64>) -> ClaimSubmission {
    ClaimSubmission {
        customer_id: CustomerId(1),
        reward_ids: reward_ids.into_iter().map(RewardId).collect(),
        remarks: None,
    }
}

#[test]
fn submit_persists_and_debits_the_customer() {
    let (service, directory, _, claims) = build_service();

    let record = service
        .submit(&operator_context(), submission(vec![10, 20]))
        .expect("claim submits");

    assert_eq!(record.points_used, 350);
    assert_eq!(record.status, ClaimStatus::Pending);
    assert_eq!(record.filed_by, "Dana");
    assert_eq!(record.reward_ids, vec![RewardId(10), RewardId(20)]);

    let refreshed = directory
        .fetch(CustomerId(1))
        .expect("fetch succeeds")
        .expect("customer present");
    assert_eq!(refreshed.total_used_points, 550);

    assert_eq!(claims.records().len(), 1);
}

#[test]
fn a_second_claim_sees_the_debited_balance() {
    let (service, _, _, _) = build_service();
    let context = operator_context();

    service
        .submit(&context, submission(vec![10, 20]))
        .expect("first claim submits");

    // 50 points remain; the 100-point reward no longer fits.
    match service.submit(&context, submission(vec![30])) {
        Err(ClaimServiceError::Validation(SubmissionError::InsufficientBalance {
            required: 100,
            available: 50,
        })) => {}
        other => panic!("expected insufficient balance, got {other:?}"),
    }
}

#[test]
fn submit_rejects_unknown_customers() {
    let (service, _, _, _) = build_service();
    let payload = ClaimSubmission {
        customer_id: CustomerId(99),
        reward_ids: vec![RewardId(10)],
        remarks: None,
    };

    match service.submit(&operator_context(), payload) {
        Err(ClaimServiceError::UnknownCustomer(CustomerId(99))) => {}
        other => panic!("expected unknown customer, got {other:?}"),
    }
}

#[test]
fn submit_rejects_unknown_rewards() {
    let (service, _, _, _) = build_service();

    match service.submit(&operator_context(), submission(vec![10, 77])) {
        Err(ClaimServiceError::UnknownReward(RewardId(77))) => {}
        other => panic!("expected unknown reward, got {other:?}"),
    }
}

#[test]
fn submit_rejects_inactive_rewards() {
    let (service, _, _, _) = build_service();

    match service.submit(&operator_context(), submission(vec![40])) {
        Err(ClaimServiceError::InactiveReward(RewardId(40))) => {}
        other => panic!("expected inactive reward, got {other:?}"),
    }
}

#[test]
fn submit_rejects_empty_reward_lists() {
    let (service, _, _, _) = build_service();

    match service.submit(&operator_context(), submission(vec![])) {
        Err(ClaimServiceError::Validation(SubmissionError::EmptyCart)) => {}
        other => panic!("expected empty cart, got {other:?}"),
    }
}

#[test]
fn reward_search_hides_inactive_entries_by_default() {
    let (service, _, _, _) = build_service();
    let request = PageRequest::default();

    let active_only = service
        .search_rewards(&request, false)
        .expect("search succeeds");
    assert_eq!(active_only.items.len(), 3);
    assert!(active_only.items.iter().all(|entry| entry.is_active));

    let everything = service
        .search_rewards(&request, true)
        .expect("search succeeds");
    assert_eq!(everything.items.len(), 4);
}

#[test]
fn customer_search_filters_and_pages() {
    let (service, _, _, _) = build_service();

    let matched = service
        .search_customers(&PageRequest::with_search("customer 2"))
        .expect("search succeeds");
    assert_eq!(matched.items.len(), 1);
    assert_eq!(matched.items[0].id, CustomerId(2));

    let second_page = service
        .search_customers(&PageRequest {
            search: None,
            page: 2,
            per_page: 1,
        })
        .expect("search succeeds");
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].id, CustomerId(2));
    assert_eq!(second_page.total, 2);
}

#[test]
fn history_is_newest_first_and_filters_by_status() {
    let (service, _, _, _) = build_service();
    let context = operator_context();

    let first = service
        .submit(&context, submission(vec![10]))
        .expect("first claim submits");
    let second = service
        .submit(&context, submission(vec![30]))
        .expect("second claim submits");

    let page = service
        .history(&ClaimHistoryQuery::default())
        .expect("history loads");
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, second.id);
    assert_eq!(page.items[1].id, first.id);

    let none_delivered = service
        .history(&ClaimHistoryQuery {
            page: PageRequest::default(),
            status: Some(ClaimStatus::Delivered),
        })
        .expect("history loads");
    assert!(none_delivered.items.is_empty());
    assert_eq!(none_delivered.total, 0);
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _, _) = build_service();

    match service.get(&ClaimId("clm-missing".to_string())) {
        Err(ClaimServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn store_outages_surface_as_repository_errors() {
    let (_, directory, catalog, _) = build_service();
    let service = ClaimService::new(directory, catalog, Arc::new(UnavailableClaims));

    match service.submit(&operator_context(), submission(vec![10])) {
        Err(ClaimServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable, got {other:?}"),
    }
}
