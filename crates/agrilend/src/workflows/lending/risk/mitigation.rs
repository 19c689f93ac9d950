//! Mitigation recommendations and parametric insurance triggers.
//!
//! `advise` is a pure function of the signal snapshot and aggregate risk; the
//! output is embedded in the owning `RiskAssessment` and never persisted on its
//! own. Rules are evaluated independently, so several can fire at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WeatherConditions;
use crate::workflows::lending::domain::{AssessmentId, FarmerId, InsuranceCoverage, LoanId};
use crate::workflows::lending::signals::{MarketSnapshot, SatelliteSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPriority {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Pending,
}

/// Recommended follow-up derived from the assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationAction {
    pub action: String,
    pub priority: ActionPriority,
    pub automated: bool,
    pub status: ActionStatus,
}

impl MitigationAction {
    fn new(action: &str, priority: ActionPriority, automated: bool) -> Self {
        Self {
            action: action.to_string(),
            priority,
            automated,
            status: ActionStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Drought,
    Flood,
    CropFailure,
}

/// Insurance trigger event. Only fired triggers are recorded, so `triggered`
/// is always true when an entry exists; the threshold and observed value are
/// kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceTrigger {
    pub triggered: bool,
    pub trigger_type: TriggerKind,
    pub threshold: f64,
    pub actual_value: f64,
    pub action: String,
}

impl InsuranceTrigger {
    fn fired(trigger_type: TriggerKind, threshold: f64, actual_value: f64, action: &str) -> Self {
        Self {
            triggered: true,
            trigger_type,
            threshold,
            actual_value,
            action: action.to_string(),
        }
    }
}

/// Claim filed against a loan's parametric policy when a trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceClaim {
    pub policy_number: String,
    pub loan_id: LoanId,
    pub farmer_id: FarmerId,
    pub trigger_type: TriggerKind,
    pub trigger_value: f64,
    pub assessment_id: AssessmentId,
    pub claim_amount: f64,
    pub filed_at: DateTime<Utc>,
}

/// Payout owed for a fired trigger. The fraction of the covered amount scales
/// with severity; crop failure pays on low vegetation rather than high.
pub fn claim_amount(coverage: &InsuranceCoverage, trigger: &InsuranceTrigger) -> f64 {
    let fraction = match trigger.trigger_type {
        TriggerKind::Drought if trigger.actual_value > 0.8 => 0.7,
        TriggerKind::Drought => 0.5,
        TriggerKind::Flood if trigger.actual_value > 0.7 => 0.8,
        TriggerKind::Flood => 0.6,
        TriggerKind::CropFailure if trigger.actual_value < 0.3 => 0.9,
        TriggerKind::CropFailure => 0.7,
    };

    (coverage.coverage_amount * fraction).round()
}

/// Derive mitigation actions and insurance triggers from the aggregate signals.
pub fn advise(
    weather: &WeatherConditions,
    satellite: &SatelliteSnapshot,
    market: &MarketSnapshot,
    overall_risk_score: u8,
) -> (Vec<MitigationAction>, Vec<InsuranceTrigger>) {
    let mut actions = Vec::new();
    let mut triggers = Vec::new();

    if weather.drought_risk > 0.6 {
        actions.push(MitigationAction::new(
            "Activate drought insurance coverage",
            ActionPriority::High,
            true,
        ));
        actions.push(MitigationAction::new(
            "Recommend drip irrigation installation",
            ActionPriority::Medium,
            false,
        ));
        triggers.push(InsuranceTrigger::fired(
            TriggerKind::Drought,
            0.6,
            weather.drought_risk,
            "Initiate drought insurance payout",
        ));
    }

    if weather.flood_risk > 0.5 {
        actions.push(MitigationAction::new(
            "Trigger flood insurance claim",
            ActionPriority::Critical,
            true,
        ));
        triggers.push(InsuranceTrigger::fired(
            TriggerKind::Flood,
            0.5,
            weather.flood_risk,
            "Initiate flood insurance payout",
        ));
    }

    if satellite.vegetation_index < 0.5 {
        actions.push(MitigationAction::new(
            "Alert for crop health monitoring",
            ActionPriority::High,
            true,
        ));
    }

    // Stricter threshold than the monitoring advisory above.
    if satellite.vegetation_index < 0.4 {
        triggers.push(InsuranceTrigger::fired(
            TriggerKind::CropFailure,
            0.4,
            satellite.vegetation_index,
            "Initiate crop insurance payout",
        ));
    }

    if market.price_volatility > 0.25 {
        actions.push(MitigationAction::new(
            "Suggest forward contract with mandis",
            ActionPriority::Medium,
            false,
        ));
    }

    if overall_risk_score > 70 {
        actions.push(MitigationAction::new(
            "Restructure loan repayment schedule",
            ActionPriority::High,
            false,
        ));
    }

    (actions, triggers)
}
