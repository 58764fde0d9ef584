use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::loyalty::session::{RequestContext, SessionProvider};

use super::domain::{ClaimStatus, ClaimSubmission};
use super::repository::{
    ClaimHistoryQuery, ClaimRepository, CustomerDirectory, PageRequest, RepositoryError,
    RewardCatalog,
};
use super::service::{ClaimService, ClaimServiceError};

/// Header carrying the operator's session token on `/admin` routes.
pub const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";

/// Shared state behind the claims routes.
pub struct ClaimsApi<D, C, S> {
    pub service: Arc<ClaimService<D, C, S>>,
    pub sessions: Arc<SessionProvider>,
}

impl<D, C, S> Clone for ClaimsApi<D, C, S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

/// Router builder exposing the claim-composer HTTP surface.
pub fn claims_router<D, C, S>(api: ClaimsApi<D, C, S>) -> Router
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    Router::new()
        .route("/api/v1/customers", get(customer_search_handler::<D, C, S>))
        .route("/api/v1/rewards", get(reward_search_handler::<D, C, S>))
        .route(
            "/api/v1/admin/claims",
            get(claim_history_handler::<D, C, S>).post(claim_submit_handler::<D, C, S>),
        )
        .with_state(api)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerSearchParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RewardSearchParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimHistoryParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    status: Option<String>,
}

fn page_request(search: Option<String>, page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        search,
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
}

pub(crate) async fn customer_search_handler<D, C, S>(
    State(api): State<ClaimsApi<D, C, S>>,
    Query(params): Query<CustomerSearchParams>,
) -> Response
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    let request = page_request(params.search, params.page, params.per_page);
    match api.service.search_customers(&request) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn reward_search_handler<D, C, S>(
    State(api): State<ClaimsApi<D, C, S>>,
    Query(params): Query<RewardSearchParams>,
) -> Response
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    let request = page_request(params.search, params.page, params.per_page);
    match api.service.search_rewards(&request, params.include_inactive) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn claim_submit_handler<D, C, S>(
    State(api): State<ClaimsApi<D, C, S>>,
    headers: HeaderMap,
    Json(submission): Json<ClaimSubmission>,
) -> Response
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    let context = match authorize(&api.sessions, &headers) {
        Ok(context) => context,
        Err(response) => return response,
    };

    match api.service.submit(&context, submission) {
        Ok(record) => (StatusCode::CREATED, Json(record.view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn claim_history_handler<D, C, S>(
    State(api): State<ClaimsApi<D, C, S>>,
    headers: HeaderMap,
    Query(params): Query<ClaimHistoryParams>,
) -> Response
where
    D: CustomerDirectory + 'static,
    C: RewardCatalog + 'static,
    S: ClaimRepository + 'static,
{
    if let Err(response) = authorize(&api.sessions, &headers) {
        return response;
    }

    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match ClaimStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                let payload = json!({ "error": format!("unknown claim status '{raw}'") });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        },
    };

    let query = ClaimHistoryQuery {
        page: page_request(params.search, params.page, params.per_page),
        status,
    };

    match api.service.history(&query) {
        Ok(page) => {
            let views: Vec<_> = page.items.iter().map(|record| record.view()).collect();
            let payload = json!({
                "items": views,
                "page": page.page,
                "per_page": page.per_page,
                "total": page.total,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

/// Resolve the operator context for an `/admin` route. Missing or unknown
/// tokens are a 401; roles without claim access are a 403.
fn authorize(sessions: &SessionProvider, headers: &HeaderMap) -> Result<RequestContext, Response> {
    let token = headers
        .get(OPERATOR_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        let payload = json!({ "error": "missing operator token" });
        return Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response());
    };

    let Some(context) = sessions.authenticate(token) else {
        let payload = json!({ "error": "unknown operator token" });
        return Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response());
    };

    if !context.role.can_manage_claims() {
        let payload = json!({ "error": "role may not manage claims" });
        return Err((StatusCode::FORBIDDEN, Json(payload)).into_response());
    }

    Ok(context)
}

fn service_error_response(error: ClaimServiceError) -> Response {
    let status = match &error {
        ClaimServiceError::Validation(_) | ClaimServiceError::InactiveReward(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClaimServiceError::UnknownCustomer(_) | ClaimServiceError::UnknownReward(_) => {
            StatusCode::NOT_FOUND
        }
        ClaimServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ClaimServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ClaimServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
