use std::sync::Arc;

use agrilend::workflows::lending::{
    lending_router, AssessmentRepository, FarmerRepository, LendingService, LoanRepository,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use crate::infra::AppState;

pub(crate) fn with_lending_routes<F, L, A>(
    service: Arc<LendingService<F, L, A>>,
) -> axum::Router
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    lending_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use agrilend::workflows::lending::{LendingService, UnderwritingConfig};

    use crate::infra::{
        simulated_signal_hub, AppState, InMemoryAssessmentStore, InMemoryFarmerRepository,
        InMemoryLoanRepository,
    };

    fn test_router(ready: bool) -> axum::Router {
        let service = Arc::new(LendingService::new(
            Arc::new(InMemoryFarmerRepository::default()),
            Arc::new(InMemoryLoanRepository::default()),
            Arc::new(InMemoryAssessmentStore::default()),
            simulated_signal_hub(),
            UnderwritingConfig::default(),
        ));
        // `pair()` installs a process-global metrics recorder, so it may only
        // run once per test binary.
        static METRICS: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
            std::sync::OnceLock::new();
        let handle = METRICS
            .get_or_init(|| axum_prometheus::PrometheusMetricLayer::pair().1)
            .clone();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(handle),
        };
        super::with_lending_routes(service).layer(axum::Extension(state))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = test_router(true)
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let response = test_router(false)
            .oneshot(
                Request::get("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = test_router(true)
            .oneshot(
                Request::get("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
