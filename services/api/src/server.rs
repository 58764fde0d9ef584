use crate::cli::ServeArgs;
use crate::infra::{
    seed_customers, seed_rewards, AppState, InMemoryClaimStore, InMemoryCustomerDirectory,
    InMemoryRewardCatalog,
};
use crate::routes::with_claims_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use loyalty_desk::config::AppConfig;
use loyalty_desk::error::AppError;
use loyalty_desk::loyalty::catalog::CatalogImporter;
use loyalty_desk::loyalty::claims::{ClaimService, ClaimsApi};
use loyalty_desk::loyalty::session::{Role, SessionProvider};
use loyalty_desk::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.catalog_csv.take() {
        config.catalog.csv_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rewards = match &config.catalog.csv_path {
        Some(path) => {
            let imported = CatalogImporter::from_path(path)?;
            info!(count = imported.len(), path = %path.display(), "reward catalog imported");
            imported
        }
        None => seed_rewards(),
    };

    let directory = Arc::new(InMemoryCustomerDirectory::seeded(seed_customers()));
    let catalog = Arc::new(InMemoryRewardCatalog::seeded(rewards));
    let claims = Arc::new(InMemoryClaimStore::default());
    let service = Arc::new(ClaimService::new(directory, catalog, claims));

    let sessions = Arc::new(SessionProvider::new());
    sessions.issue(
        &config.session.operator_token,
        &config.session.operator_name,
        Role::Admin,
    );

    let api = ClaimsApi { service, sessions };

    let app = with_claims_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loyalty back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
