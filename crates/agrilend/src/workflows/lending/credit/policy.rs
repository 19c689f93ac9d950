use crate::workflows::lending::domain::{DecisionOutcome, LoanType};
use crate::workflows::lending::risk::RiskAssessment;

/// Ordered decision matrix over (credit score, aggregate risk, loan type).
///
/// The first matching approval rule wins. When no approval rule matches,
/// rejection reasons accumulate independently; the group-lending override is
/// checked last and can still flip the outcome. A gray-zone application that
/// produces no rejection reason goes to manual review instead.
pub fn decide(
    credit_score: u16,
    assessment: &RiskAssessment,
    loan_type: LoanType,
) -> (DecisionOutcome, Vec<String>) {
    let risk = assessment.overall_risk_score;
    let mut reasons = Vec::new();

    if credit_score >= 700 && risk < 50 {
        reasons.push("Excellent credit score and low risk profile".to_string());
        return (DecisionOutcome::Approved, reasons);
    }
    if credit_score >= 600 && risk < 60 {
        reasons.push("Good credit score with acceptable risk level".to_string());
        return (DecisionOutcome::Approved, reasons);
    }
    if credit_score >= 550 && risk < 40 {
        reasons.push("Moderate credit score but low risk indicators".to_string());
        return (DecisionOutcome::Approved, reasons);
    }

    if credit_score < 500 {
        reasons.push("Credit score below minimum threshold".to_string());
    }
    if risk > 70 {
        reasons.push("High risk level detected in forward risk analysis".to_string());
    }
    if assessment.weather.drought_risk > 0.8 {
        reasons.push("Critical drought risk in region".to_string());
    }
    if assessment.satellite.vegetation_index < 0.3 {
        reasons.push("Poor crop health indicators from satellite data".to_string());
    }

    if loan_type == LoanType::GroupLending && credit_score >= 500 {
        reasons.push("Approved under group lending scheme with lower threshold".to_string());
        return (DecisionOutcome::Approved, reasons);
    }

    if reasons.is_empty() {
        reasons.push("Requires manual underwriting review".to_string());
        return (DecisionOutcome::ManualReview, reasons);
    }

    (DecisionOutcome::Rejected, reasons)
}
