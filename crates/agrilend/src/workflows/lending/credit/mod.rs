mod config;
pub mod policy;
pub mod scoring;

pub use config::{RedecisionPolicy, UnderwritingConfig};
pub use scoring::{ScoreComponent, ScoreFactor};

use chrono::Utc;
use std::time::Instant;

use super::domain::{CreditDecision, FarmerProfile, LoanApplication};
use super::risk::RiskAssessment;

/// Stateless engine turning a scored application into a recorded decision.
pub struct CreditDecisionEngine {
    config: UnderwritingConfig,
}

impl CreditDecisionEngine {
    pub fn new(config: UnderwritingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UnderwritingConfig {
        &self.config
    }

    /// Score the application and apply the decision matrix. `started` marks the
    /// beginning of the end-to-end decisioning request so the reported latency
    /// covers signal gathering and forecasting too.
    pub fn decide(
        &self,
        farmer: &FarmerProfile,
        loan: &LoanApplication,
        assessment: &RiskAssessment,
        started: Instant,
    ) -> (CreditDecision, Vec<ScoreComponent>) {
        let (score, components) = scoring::score_application(farmer, loan, assessment, &self.config);
        let (decision, reasons) = policy::decide(score, assessment, loan.loan_type);

        let record = CreditDecision {
            decision,
            score,
            risk_level: assessment.risk_category,
            decided_at: Utc::now(),
            automated: true,
            reasons,
            decision_time_ms: started.elapsed().as_millis() as u64,
        };

        (record, components)
    }
}
