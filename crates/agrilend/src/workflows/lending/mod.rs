//! Loan origination, credit decisioning, and forward-risk assessment.
//!
//! The pipeline runs in three layers: the signal hub gathers (or falls back
//! on) weather, satellite, market, and alternative-data snapshots; the
//! forecaster turns those into a 15-day risk series with mitigation advice;
//! the credit engine scores the application against that assessment and
//! applies the decision matrix. The service facade wires the layers to the
//! repositories and owns the repayment lifecycle and the periodic sweeps.

pub mod credit;
pub mod domain;
pub mod repayment;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;
pub mod signals;

#[cfg(test)]
mod tests;

pub use credit::{
    CreditDecisionEngine, RedecisionPolicy, ScoreComponent, ScoreFactor, UnderwritingConfig,
};
pub use domain::{
    AssessmentId, CreditDecision, DecisionOutcome, DisbursementRecord, FarmerId, FarmerProfile,
    GeoPoint, InsuranceCoverage, IrrigationType, KycDocuments, LandHolding, LoanApplication,
    LoanId, LoanRequest, LoanStatus, LoanType, RegistryLink, RepaymentInstallment, Season,
    ValidationError,
};
pub use repository::{
    AssessmentRepository, FarmerRepository, LoanRepository, LoanStatusView, RepositoryError,
};
pub use risk::{
    mitigation::{ActionPriority, InsuranceClaim, InsuranceTrigger, MitigationAction, TriggerKind},
    DailyRiskPoint, ForwardRiskForecaster, RiskAssessment, RiskLevel,
};
pub use router::lending_router;
pub use service::{LendingService, LendingServiceError};
pub use signals::{
    AlternativeDataProvider, AlternativeSnapshot, CropHealth, MarketProvider, MarketSnapshot,
    SatelliteProvider, SatelliteSnapshot, SignalBundle, SignalError, SignalHub, WeatherProvider,
    WeatherSnapshot, FORECAST_DAYS,
};
