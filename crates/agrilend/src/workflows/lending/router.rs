use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{FarmerId, LoanId, LoanRequest};
use super::repository::{
    AssessmentRepository, FarmerRepository, LoanRepository, LoanStatusView, RepositoryError,
};
use super::service::{LendingService, LendingServiceError};

/// Router builder exposing the lending endpoints.
pub fn lending_router<F, L, A>(service: Arc<LendingService<F, L, A>>) -> Router
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    Router::new()
        .route("/api/v1/loans", post(apply_handler::<F, L, A>))
        .route("/api/v1/loans/:loan_id", get(status_handler::<F, L, A>))
        .route(
            "/api/v1/loans/:loan_id/decision",
            post(decision_handler::<F, L, A>),
        )
        .route(
            "/api/v1/loans/:loan_id/disbursement",
            post(disburse_handler::<F, L, A>),
        )
        .route(
            "/api/v1/loans/:loan_id/payments",
            post(payment_handler::<F, L, A>),
        )
        .route(
            "/api/v1/risk/assessments",
            post(assess_handler::<F, L, A>),
        )
        .route(
            "/api/v1/risk/assessments/:farmer_id/latest",
            get(latest_assessment_handler::<F, L, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisbursementRequest {
    pub(crate) account_number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentRequest {
    pub(crate) amount: f64,
    pub(crate) paid_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    pub(crate) farmer_id: FarmerId,
    #[serde(default)]
    pub(crate) loan_id: Option<LoanId>,
}

fn error_response(error: LendingServiceError) -> Response {
    let status = match &error {
        LendingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LendingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LendingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LendingServiceError::DecisionLocked { .. }
        | LendingServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        LendingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn apply_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Json(request): Json<LoanRequest>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.apply(request) {
        Ok(loan) => (StatusCode::CREATED, Json(LoanStatusView::from_loan(&loan))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Path(loan_id): Path<String>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.get(&LoanId(loan_id)) {
        Ok(loan) => (StatusCode::OK, Json(LoanStatusView::from_loan(&loan))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Path(loan_id): Path<String>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.decide(&LoanId(loan_id)) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn disburse_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Path(loan_id): Path<String>,
    Json(request): Json<DisbursementRequest>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.disburse(&LoanId(loan_id), &request.account_number) {
        Ok(loan) => (StatusCode::OK, Json(LoanStatusView::from_loan(&loan))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Path(loan_id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.record_payment(&LoanId(loan_id), request.amount, request.paid_on) {
        Ok(loan) => (StatusCode::OK, Json(LoanStatusView::from_loan(&loan))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assess_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Json(request): Json<AssessmentRequest>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.assess(&request.farmer_id, request.loan_id.as_ref()) {
        Ok(assessment) => (StatusCode::CREATED, Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_assessment_handler<F, L, A>(
    State(service): State<Arc<LendingService<F, L, A>>>,
    Path(farmer_id): Path<String>,
) -> Response
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    match service.latest_assessment(&FarmerId(farmer_id)) {
        Ok(Some(assessment)) => (StatusCode::OK, Json(assessment)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no assessment on record" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
