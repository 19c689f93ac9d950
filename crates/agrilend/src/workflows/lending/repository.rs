use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{FarmerId, FarmerProfile, LoanApplication, LoanId, LoanStatus};
use super::risk::RiskAssessment;

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

/// Storage abstraction for borrower profiles.
pub trait FarmerRepository: Send + Sync {
    fn insert(&self, farmer: FarmerProfile) -> Result<FarmerProfile, RepositoryError>;
    fn update(&self, farmer: FarmerProfile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &FarmerId) -> Result<Option<FarmerProfile>, RepositoryError>;
}

/// Storage abstraction for loan applications.
pub trait LoanRepository: Send + Sync {
    fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, RepositoryError>;
    fn update(&self, loan: LoanApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LoanId) -> Result<Option<LoanApplication>, RepositoryError>;
    /// Loans in any of the given statuses, for the periodic sweeps.
    fn in_status(&self, statuses: &[LoanStatus]) -> Result<Vec<LoanApplication>, RepositoryError>;
}

/// Append-only store of risk assessments; history is never rewritten.
pub trait AssessmentRepository: Send + Sync {
    fn append(&self, assessment: RiskAssessment) -> Result<(), RepositoryError>;
    fn latest_for(&self, farmer_id: &FarmerId) -> Result<Option<RiskAssessment>, RepositoryError>;
    /// Assessments recorded after `since` that fired at least one insurance
    /// trigger, for the claim sweep.
    fn triggered_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
}

/// Sanitized representation of a loan's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct LoanStatusView {
    pub loan_id: LoanId,
    pub status: &'static str,
    pub outstanding_amount: f64,
    pub risk_score: u8,
    pub decision_rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u16>,
}

impl LoanStatusView {
    pub fn from_loan(loan: &LoanApplication) -> Self {
        let (decision_rationale, credit_score) = match &loan.credit_decision {
            Some(decision) => (decision.summary(), Some(decision.score)),
            None => ("pending decision".to_string(), None),
        };

        Self {
            loan_id: loan.loan_id.clone(),
            status: loan.status.label(),
            outstanding_amount: loan.outstanding_amount,
            risk_score: loan.risk_score,
            decision_rationale,
            credit_score,
        }
    }
}
