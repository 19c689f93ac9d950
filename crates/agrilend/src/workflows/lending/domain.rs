use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::risk::RiskLevel;

/// Identifier wrapper for registered borrowers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarmerId(pub String);

impl fmt::Display for FarmerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(pub String);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for persisted risk assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// WGS84 coordinate used for weather and satellite lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Irrigation method on record for the holding; better methods score higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrigationType {
    Drip,
    Sprinkler,
    Canal,
    RainFed,
}

/// Land attributes captured at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandHolding {
    pub total_area_acres: f64,
    pub soil_type: String,
    pub irrigation: IrrigationType,
    pub crops: Vec<String>,
}

/// Document references collected during KYC; presence alone contributes to scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycDocuments {
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub land_records: Option<String>,
    pub bank_account: Option<String>,
}

/// Link to the government farm registry (AgriStack-style) verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLink {
    pub registry_id: Option<String>,
    pub verified: bool,
}

/// Registered borrower profile. Never hard-deleted; the running credit score is
/// refreshed by periodic re-decisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub farmer_id: FarmerId,
    pub name: String,
    pub coordinates: Option<GeoPoint>,
    pub land: LandHolding,
    pub kyc: KycDocuments,
    pub kyc_verified: bool,
    pub registry: RegistryLink,
    /// FPO/JLG cooperative membership, a positive scoring signal.
    pub cooperative: Option<String>,
    pub credit_score: Option<u16>,
}

/// Product types offered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    WorkingCapitalCard,
    CropSeason,
    AssetFinance,
    GroupLending,
}

impl LoanType {
    pub const fn label(self) -> &'static str {
        match self {
            LoanType::WorkingCapitalCard => "working_capital_card",
            LoanType::CropSeason => "crop_season",
            LoanType::AssetFinance => "asset_finance",
            LoanType::GroupLending => "group_lending",
        }
    }
}

/// Cropping season context for seasonal loans; drives the bullet-repayment horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
}

/// Loan lifecycle states. Terminal states are `Closed`, `Rejected`, and
/// `NonPerforming`; records are transitioned, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Disbursed,
    Active,
    Closed,
    #[serde(rename = "NPA")]
    NonPerforming,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Disbursed => "disbursed",
            LoanStatus::Active => "active",
            LoanStatus::Closed => "closed",
            LoanStatus::NonPerforming => "npa",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Automated underwriting verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    ManualReview,
}

/// Credit decision recorded on the loan. Re-decisioning replaces the record, it
/// never appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDecision {
    pub decision: DecisionOutcome,
    pub score: u16,
    pub risk_level: RiskLevel,
    pub decided_at: DateTime<Utc>,
    pub automated: bool,
    pub reasons: Vec<String>,
    pub decision_time_ms: u64,
}

impl CreditDecision {
    pub fn summary(&self) -> String {
        let verdict = match self.decision {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Rejected => "rejected",
            DecisionOutcome::ManualReview => "manual review",
        };
        if self.reasons.is_empty() {
            verdict.to_string()
        } else {
            format!("{verdict}: {}", self.reasons.join("; "))
        }
    }
}

/// Record of funds leaving the platform for an approved loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementRecord {
    pub date: DateTime<Utc>,
    pub method: String,
    pub account_number: String,
    pub transaction_id: String,
}

/// One element of the repayment schedule; settled independently as payments land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentInstallment {
    pub due_date: NaiveDate,
    pub amount: f64,
    pub principal: f64,
    pub interest: f64,
    pub paid: bool,
    pub paid_date: Option<NaiveDate>,
}

/// Parametric insurance attached to a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceCoverage {
    pub provider: String,
    pub policy_number: String,
    pub coverage_amount: f64,
    pub premium: f64,
}

/// A loan application and its full lifecycle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan_id: LoanId,
    pub farmer_id: FarmerId,
    pub loan_type: LoanType,
    pub amount: f64,
    pub purpose: String,
    pub crop: Option<String>,
    pub season: Option<Season>,
    pub tenure_months: u32,
    /// Annual interest rate in percent.
    pub interest_rate: f64,
    pub status: LoanStatus,
    pub application_date: NaiveDate,
    pub credit_decision: Option<CreditDecision>,
    pub disbursement: Option<DisbursementRecord>,
    pub repayment_schedule: Vec<RepaymentInstallment>,
    pub outstanding_amount: f64,
    /// Latest aggregate forward-risk score recorded for the loan.
    pub risk_score: u8,
    pub insurance: Option<InsuranceCoverage>,
}

/// Inbound application payload, validated before any scoring runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub farmer_id: FarmerId,
    pub loan_type: LoanType,
    pub amount: f64,
    pub purpose: String,
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default)]
    pub season: Option<Season>,
    pub tenure_months: u32,
    /// Annual interest rate in percent; defaults from configuration when absent.
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

impl LoanRequest {
    /// Intake precondition checks. Malformed attributes are rejected here so the
    /// scoring engine never sees them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        if self.tenure_months == 0 {
            return Err(ValidationError::ZeroTenure);
        }
        if let Some(rate) = self.interest_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ValidationError::InvalidInterestRate { rate });
            }
        }
        if self.loan_type == LoanType::CropSeason && self.season.is_none() {
            return Err(ValidationError::MissingSeason);
        }
        Ok(())
    }
}

/// Validation errors raised during application intake.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("loan amount must be positive, got {amount}")]
    NonPositiveAmount { amount: f64 },
    #[error("loan tenure must be at least one month")]
    ZeroTenure,
    #[error("interest rate must be a non-negative percentage, got {rate}")]
    InvalidInterestRate { rate: f64 },
    #[error("crop-season loans require a season")]
    MissingSeason,
}
