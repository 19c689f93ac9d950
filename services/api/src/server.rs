use std::sync::atomic::Ordering;
use std::sync::Arc;

use agrilend::config::AppConfig;
use agrilend::error::AppError;
use agrilend::telemetry;
use agrilend::workflows::lending::LendingService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{
    simulated_signal_hub, AppState, InMemoryAssessmentStore, InMemoryFarmerRepository,
    InMemoryLoanRepository,
};
use crate::routes::with_lending_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lending_service = Arc::new(LendingService::new(
        Arc::new(InMemoryFarmerRepository::default()),
        Arc::new(InMemoryLoanRepository::default()),
        Arc::new(InMemoryAssessmentStore::default()),
        simulated_signal_hub(),
        config.lending.underwriting(),
    ));

    let app = with_lending_routes(lending_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "agri lending platform ready");

    axum::serve(listener, app).await?;
    Ok(())
}
