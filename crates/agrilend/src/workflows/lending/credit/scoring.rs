use serde::{Deserialize, Serialize};

use super::config::UnderwritingConfig;
use crate::workflows::lending::domain::{FarmerProfile, IrrigationType, LoanApplication};
use crate::workflows::lending::risk::RiskAssessment;

/// Factors permitted in the creditworthiness rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreFactor {
    Verification,
    Registry,
    LandHolding,
    Irrigation,
    ForwardRisk,
    AlternativeData,
    Cooperative,
    LoanToValue,
}

/// Discrete contribution to a credit score, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i32,
    pub notes: String,
}

/// Additive credit score over profile, loan, and forward-risk inputs.
///
/// Starts from the configured base, accumulates the component table below, and
/// clamps to `[0, max_score]`. The forward-risk term is the only one that can
/// go negative.
pub fn score_application(
    farmer: &FarmerProfile,
    loan: &LoanApplication,
    assessment: &RiskAssessment,
    config: &UnderwritingConfig,
) -> (u16, Vec<ScoreComponent>) {
    let mut components = Vec::new();

    let mut verification = 0;
    if farmer.kyc_verified {
        verification += 50;
    }
    if farmer.kyc.national_id.is_some() {
        verification += 20;
    }
    if farmer.kyc.tax_id.is_some() {
        verification += 15;
    }
    if farmer.kyc.land_records.is_some() {
        verification += 15;
    }
    components.push(ScoreComponent {
        factor: ScoreFactor::Verification,
        points: verification,
        notes: if farmer.kyc_verified {
            "KYC verified with documents on file".to_string()
        } else {
            "KYC verification incomplete".to_string()
        },
    });

    let registry = if farmer.registry.verified { 100 } else { 30 };
    components.push(ScoreComponent {
        factor: ScoreFactor::Registry,
        points: registry,
        notes: if farmer.registry.verified {
            "farm registry verified".to_string()
        } else {
            "farm registry link unverified".to_string()
        },
    });

    let area = farmer.land.total_area_acres;
    let land = if area > 10.0 {
        40
    } else if area > 5.0 {
        30
    } else if area > 2.0 {
        20
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::LandHolding,
        points: land,
        notes: format!("{area:.1} acres on record"),
    });

    let irrigation = match farmer.land.irrigation {
        IrrigationType::Drip | IrrigationType::Sprinkler => 20,
        IrrigationType::Canal => 15,
        IrrigationType::RainFed => 0,
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::Irrigation,
        points: irrigation,
        notes: format!("{:?} irrigation", farmer.land.irrigation),
    });

    let risk_penalty = (assessment.overall_risk_score as f64 * 1.5).round() as i32;
    let forward_risk = 150 - risk_penalty;
    components.push(ScoreComponent {
        factor: ScoreFactor::ForwardRisk,
        points: forward_risk,
        notes: format!(
            "aggregate forward risk {} ({})",
            assessment.overall_risk_score,
            assessment.risk_category.label()
        ),
    });

    let alt = &assessment.alternative;
    let alternative = (alt.registry_score * 20.0).round() as i32
        + (alt.digital_footprint * 20.0).round() as i32
        + (alt.community_rating * 30.0).round() as i32;
    components.push(ScoreComponent {
        factor: ScoreFactor::AlternativeData,
        points: alternative,
        notes: format!(
            "registry {:.2}, digital footprint {:.2}, community rating {:.2}",
            alt.registry_score, alt.digital_footprint, alt.community_rating
        ),
    });

    let cooperative = if farmer.cooperative.is_some() { 50 } else { 0 };
    components.push(ScoreComponent {
        factor: ScoreFactor::Cooperative,
        points: cooperative,
        notes: match &farmer.cooperative {
            Some(name) => format!("member of {name}"),
            None => "no cooperative membership".to_string(),
        },
    });

    let collateral = area * config.collateral_value_per_acre;
    let (ltv_points, ltv_notes) = if collateral > 0.0 {
        let ltv = loan.amount / collateral;
        let points = if ltv < 0.5 {
            50
        } else if ltv < 0.7 {
            35
        } else if ltv < 0.9 {
            20
        } else {
            0
        };
        (points, format!("loan-to-value {ltv:.2}"))
    } else {
        (0, "no collateral basis on record".to_string())
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::LoanToValue,
        points: ltv_points,
        notes: ltv_notes,
    });

    let total: i32 = config.base_score as i32
        + components.iter().map(|component| component.points).sum::<i32>();
    let score = total.clamp(0, config.max_score as i32) as u16;

    (score, components)
}
