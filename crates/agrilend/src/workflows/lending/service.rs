use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::credit::{CreditDecisionEngine, RedecisionPolicy, UnderwritingConfig};
use super::domain::{
    CreditDecision, DecisionOutcome, DisbursementRecord, FarmerId, FarmerProfile,
    InsuranceCoverage, LoanApplication, LoanId, LoanRequest, LoanStatus, ValidationError,
};
use super::repayment;
use super::repository::{
    AssessmentRepository, FarmerRepository, LoanRepository, RepositoryError,
};
use super::risk::mitigation::{self, InsuranceClaim};
use super::risk::{ForwardRiskForecaster, RiskAssessment};
use super::signals::SignalHub;

/// Service composing the repositories, signal hub, forecaster, and decision
/// engine into the lending workflow facade.
pub struct LendingService<F, L, A> {
    farmers: Arc<F>,
    loans: Arc<L>,
    assessments: Arc<A>,
    forecaster: ForwardRiskForecaster,
    engine: CreditDecisionEngine,
    /// Advisory flag so overlapping risk sweeps skip instead of doubling work.
    sweep_active: AtomicBool,
}

static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_loan_id() -> LoanId {
    let id = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanId(format!("LOAN-{id:06}"))
}

impl<F, L, A> LendingService<F, L, A>
where
    F: FarmerRepository + 'static,
    L: LoanRepository + 'static,
    A: AssessmentRepository + 'static,
{
    pub fn new(
        farmers: Arc<F>,
        loans: Arc<L>,
        assessments: Arc<A>,
        hub: SignalHub,
        config: UnderwritingConfig,
    ) -> Self {
        let forecaster = ForwardRiskForecaster::new(hub, config.default_location);
        let engine = CreditDecisionEngine::new(config);

        Self {
            farmers,
            loans,
            assessments,
            forecaster,
            engine,
            sweep_active: AtomicBool::new(false),
        }
    }

    fn config(&self) -> &UnderwritingConfig {
        self.engine.config()
    }

    /// Register a borrower profile.
    pub fn register_farmer(
        &self,
        farmer: FarmerProfile,
    ) -> Result<FarmerProfile, LendingServiceError> {
        let stored = self.farmers.insert(farmer)?;
        Ok(stored)
    }

    /// Submit a new loan application. Intake validation runs before anything
    /// else; the application lands in `PENDING` awaiting a decision.
    pub fn apply(&self, request: LoanRequest) -> Result<LoanApplication, LendingServiceError> {
        request.validate()?;
        self.farmers
            .fetch(&request.farmer_id)?
            .ok_or(RepositoryError::NotFound)?;

        let loan = LoanApplication {
            loan_id: next_loan_id(),
            farmer_id: request.farmer_id,
            loan_type: request.loan_type,
            amount: request.amount,
            purpose: request.purpose,
            crop: request.crop,
            season: request.season,
            tenure_months: request.tenure_months,
            interest_rate: request
                .interest_rate
                .unwrap_or(self.config().default_interest_rate),
            status: LoanStatus::Pending,
            application_date: Utc::now().date_naive(),
            credit_decision: None,
            disbursement: None,
            repayment_schedule: Vec::new(),
            outstanding_amount: 0.0,
            risk_score: 0,
            insurance: None,
        };

        let stored = self.loans.insert(loan)?;
        info!(loan = %stored.loan_id, farmer = %stored.farmer_id, "loan application received");
        Ok(stored)
    }

    /// Run the automated credit decision: forecast, score, decide, persist.
    ///
    /// The assessment write and the loan update are the hard-failure paths; an
    /// un-persisted decision is never reported as final.
    pub fn decide(&self, loan_id: &LoanId) -> Result<CreditDecision, LendingServiceError> {
        let started = Instant::now();

        let mut loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        if self.config().redecision == RedecisionPolicy::LockAfterFinal
            && loan.status != LoanStatus::Pending
        {
            return Err(LendingServiceError::DecisionLocked {
                loan: loan_id.clone(),
            });
        }

        let mut farmer = self
            .farmers
            .fetch(&loan.farmer_id)?
            .ok_or(RepositoryError::NotFound)?;

        let today = Utc::now().date_naive();
        let assessment = self.forecaster.forecast(&farmer, Some(loan_id), today);
        self.assessments.append(assessment.clone())?;

        let (decision, components) = self.engine.decide(&farmer, &loan, &assessment, started);
        debug!(loan = %loan_id, ?components, "credit score breakdown");

        loan.status = match decision.decision {
            DecisionOutcome::Approved => LoanStatus::Approved,
            DecisionOutcome::Rejected => LoanStatus::Rejected,
            DecisionOutcome::ManualReview => LoanStatus::Pending,
        };
        loan.risk_score = assessment.overall_risk_score;
        loan.credit_decision = Some(decision.clone());
        self.loans.update(loan)?;

        farmer.credit_score = Some(decision.score);
        self.farmers.update(farmer)?;

        info!(
            loan = %loan_id,
            outcome = ?decision.decision,
            score = decision.score,
            risk = assessment.overall_risk_score,
            elapsed_ms = decision.decision_time_ms,
            "credit decision recorded"
        );
        Ok(decision)
    }

    /// Run an on-demand forward risk assessment and persist it.
    pub fn assess(
        &self,
        farmer_id: &FarmerId,
        loan_id: Option<&LoanId>,
    ) -> Result<RiskAssessment, LendingServiceError> {
        let farmer = self
            .farmers
            .fetch(farmer_id)?
            .ok_or(RepositoryError::NotFound)?;

        let assessment = self
            .forecaster
            .forecast(&farmer, loan_id, Utc::now().date_naive());
        self.assessments.append(assessment.clone())?;
        Ok(assessment)
    }

    /// Latest persisted assessment for a borrower, if any.
    pub fn latest_assessment(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Option<RiskAssessment>, LendingServiceError> {
        Ok(self.assessments.latest_for(farmer_id)?)
    }

    /// Disburse an approved loan: record the transfer, generate the repayment
    /// schedule, and reset the outstanding balance to the full principal.
    pub fn disburse(
        &self,
        loan_id: &LoanId,
        account_number: &str,
    ) -> Result<LoanApplication, LendingServiceError> {
        let mut loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        if loan.status != LoanStatus::Approved {
            return Err(LendingServiceError::InvalidTransition {
                loan: loan_id.clone(),
                action: "disbursed",
                status: loan.status,
            });
        }

        let now = Utc::now();
        loan.disbursement = Some(DisbursementRecord {
            date: now,
            method: "Bank Transfer".to_string(),
            account_number: account_number.to_string(),
            transaction_id: format!("TXN-{}-{}", now.timestamp_millis(), loan_id),
        });
        loan.repayment_schedule = repayment::build_schedule(&loan, now.date_naive());
        loan.outstanding_amount = loan.amount;
        loan.status = LoanStatus::Disbursed;
        self.loans.update(loan.clone())?;

        info!(loan = %loan_id, amount = loan.amount, "loan disbursed");
        Ok(loan)
    }

    /// Apply a repayment. Installments settle in order; the loan closes once
    /// every installment is paid.
    pub fn record_payment(
        &self,
        loan_id: &LoanId,
        amount: f64,
        paid_on: NaiveDate,
    ) -> Result<LoanApplication, LendingServiceError> {
        let mut loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        if loan.repayment_schedule.is_empty() {
            return Err(LendingServiceError::InvalidTransition {
                loan: loan_id.clone(),
                action: "repaid",
                status: loan.status,
            });
        }

        let settled = repayment::apply_payment(&mut loan.repayment_schedule, amount, paid_on);
        loan.outstanding_amount = (loan.outstanding_amount - settled).max(0.0);
        loan.status = if repayment::is_settled(&loan.repayment_schedule) {
            LoanStatus::Closed
        } else {
            LoanStatus::Active
        };
        self.loans.update(loan.clone())?;

        info!(loan = %loan_id, amount, settled_principal = settled, "payment processed");
        Ok(loan)
    }

    /// Fetch a loan for API responses.
    pub fn get(&self, loan_id: &LoanId) -> Result<LoanApplication, LendingServiceError> {
        let loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(loan)
    }

    /// Periodic sweep: re-run the forecaster for every live loan. If another
    /// sweep is still running, this invocation skips with a warning rather
    /// than overlapping it.
    pub fn refresh_risk_sweep(&self) -> Result<usize, LendingServiceError> {
        if self.sweep_active.swap(true, Ordering::AcqRel) {
            warn!("risk refresh sweep already in progress, skipping");
            return Ok(0);
        }
        let result = self.run_risk_sweep();
        self.sweep_active.store(false, Ordering::Release);
        result
    }

    fn run_risk_sweep(&self) -> Result<usize, LendingServiceError> {
        let live = self
            .loans
            .in_status(&[LoanStatus::Active, LoanStatus::Disbursed])?;
        let mut refreshed = 0;

        for mut loan in live {
            let Some(farmer) = self.farmers.fetch(&loan.farmer_id)? else {
                warn!(loan = %loan.loan_id, farmer = %loan.farmer_id, "borrower missing, skipping risk refresh");
                continue;
            };

            let assessment =
                self.forecaster
                    .forecast(&farmer, Some(&loan.loan_id), Utc::now().date_naive());
            self.assessments.append(assessment.clone())?;

            loan.risk_score = assessment.overall_risk_score;
            self.loans.update(loan)?;
            refreshed += 1;
        }

        info!(refreshed, "risk scores refreshed for live loans");
        Ok(refreshed)
    }

    /// Attach a parametric insurance policy to a loan so the claim sweep can
    /// file against it.
    pub fn attach_insurance(
        &self,
        loan_id: &LoanId,
        coverage: InsuranceCoverage,
    ) -> Result<LoanApplication, LendingServiceError> {
        let mut loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        loan.insurance = Some(coverage);
        self.loans.update(loan.clone())?;

        info!(loan = %loan_id, "insurance coverage attached");
        Ok(loan)
    }

    /// Periodic sweep: file claims for every insurance trigger recorded since
    /// `since` where the borrower has a covered live loan. Uncovered loans and
    /// borrowers without a live loan are skipped silently.
    pub fn insurance_sweep(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<InsuranceClaim>, LendingServiceError> {
        let assessments = self.assessments.triggered_since(since)?;
        let live = self
            .loans
            .in_status(&[LoanStatus::Active, LoanStatus::Disbursed])?;
        let mut claims = Vec::new();

        for assessment in assessments {
            let Some(loan) = live
                .iter()
                .find(|loan| loan.farmer_id == assessment.farmer_id)
            else {
                continue;
            };
            let Some(coverage) = &loan.insurance else {
                continue;
            };

            for trigger in &assessment.insurance_triggers {
                let claim = InsuranceClaim {
                    policy_number: coverage.policy_number.clone(),
                    loan_id: loan.loan_id.clone(),
                    farmer_id: loan.farmer_id.clone(),
                    trigger_type: trigger.trigger_type,
                    trigger_value: trigger.actual_value,
                    assessment_id: assessment.assessment_id.clone(),
                    claim_amount: mitigation::claim_amount(coverage, trigger),
                    filed_at: Utc::now(),
                };
                info!(
                    loan = %claim.loan_id,
                    trigger = ?claim.trigger_type,
                    amount = claim.claim_amount,
                    "insurance claim filed"
                );
                claims.push(claim);
            }
        }

        info!(claims = claims.len(), "insurance trigger sweep complete");
        Ok(claims)
    }

    /// Periodic sweep: mark active loans overdue beyond the grace period as
    /// non-performing. Returns the loans transitioned.
    pub fn npa_sweep(&self, today: NaiveDate) -> Result<Vec<LoanId>, LendingServiceError> {
        let active = self.loans.in_status(&[LoanStatus::Active])?;
        let mut flagged = Vec::new();

        for mut loan in active {
            let overdue = repayment::max_overdue_days(&loan.repayment_schedule, today);
            if overdue > self.config().npa_grace_days {
                loan.status = LoanStatus::NonPerforming;
                self.loans.update(loan.clone())?;
                warn!(loan = %loan.loan_id, overdue_days = overdue, "loan marked as NPA");
                flagged.push(loan.loan_id);
            }
        }

        Ok(flagged)
    }
}

/// Error raised by the lending service.
#[derive(Debug, thiserror::Error)]
pub enum LendingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("loan {loan} already has a final decision")]
    DecisionLocked { loan: LoanId },
    #[error("loan {loan} cannot be {action} while {status}")]
    InvalidTransition {
        loan: LoanId,
        action: &'static str,
        status: LoanStatus,
    },
}
