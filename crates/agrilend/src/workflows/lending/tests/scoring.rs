use super::common::*;
use crate::workflows::lending::credit::scoring::score_application;
use crate::workflows::lending::credit::{ScoreFactor, UnderwritingConfig};

#[test]
fn scorer_caps_a_strong_profile_at_the_maximum() {
    let config = UnderwritingConfig::default();
    let farmer = strong_farmer("score-strong");
    let loan = loan_fixture(&farmer, 50_000.0);
    let assessment = assessment_with(33, 0.3, 0.7);

    let (score, components) = score_application(&farmer, &loan, &assessment, &config);

    // Raw total 999 before the cap: 500 base + 100 verification + 100 registry
    // + 30 land + 20 drip + 100 forward risk + 49 alternative + 50 cooperative
    // + 50 loan-to-value.
    assert_eq!(score, config.max_score);
    assert_eq!(components.len(), 8);
    assert_eq!(
        components.iter().map(|component| component.points).sum::<i32>(),
        499
    );
}

#[test]
fn scorer_awards_every_factor_once() {
    let config = UnderwritingConfig::default();
    let farmer = strong_farmer("score-factors");
    let loan = loan_fixture(&farmer, 50_000.0);
    let assessment = assessment_with(33, 0.3, 0.7);

    let (_, components) = score_application(&farmer, &loan, &assessment, &config);

    for factor in [
        ScoreFactor::Verification,
        ScoreFactor::Registry,
        ScoreFactor::LandHolding,
        ScoreFactor::Irrigation,
        ScoreFactor::ForwardRisk,
        ScoreFactor::AlternativeData,
        ScoreFactor::Cooperative,
        ScoreFactor::LoanToValue,
    ] {
        assert_eq!(
            components
                .iter()
                .filter(|component| component.factor == factor)
                .count(),
            1,
            "expected exactly one {factor:?} component"
        );
    }
}

#[test]
fn forward_risk_term_scales_with_the_aggregate() {
    let config = UnderwritingConfig::default();
    let farmer = strong_farmer("score-risk");
    let loan = loan_fixture(&farmer, 50_000.0);

    for (aggregate, expected) in [(0u8, 150), (40, 90), (100, 0)] {
        let assessment = assessment_with(aggregate, 0.3, 0.7);
        let (_, components) = score_application(&farmer, &loan, &assessment, &config);
        let forward = components
            .iter()
            .find(|component| component.factor == ScoreFactor::ForwardRisk)
            .expect("forward risk component present");
        assert_eq!(forward.points, expected, "aggregate {aggregate}");
    }
}

#[test]
fn scorer_penalises_a_thin_file() {
    let config = UnderwritingConfig::default();
    let farmer = unbanked_farmer("score-thin");
    // 1 acre at the default collateral value puts LTV at 0.9, worth nothing.
    let loan = loan_fixture(&farmer, 45_000.0);
    let assessment = assessment_with(60, 0.3, 0.7);

    let (score, components) = score_application(&farmer, &loan, &assessment, &config);

    // 500 base + 0 verification + 30 unverified registry + 0 land + 0 rain-fed
    // + 60 forward risk + 49 alternative + 0 cooperative + 0 loan-to-value.
    assert_eq!(score, 639);
    let verification = components
        .iter()
        .find(|component| component.factor == ScoreFactor::Verification)
        .expect("verification component present");
    assert_eq!(verification.points, 0);
    assert_eq!(verification.notes, "KYC verification incomplete");
}

#[test]
fn loan_to_value_bands_step_down_with_exposure() {
    let config = UnderwritingConfig::default();
    let farmer = strong_farmer("score-ltv");
    let assessment = assessment_with(33, 0.3, 0.7);

    // 6 acres at 50,000 per acre gives a 300,000 collateral basis.
    for (amount, expected) in [
        (120_000.0, 50),
        (180_000.0, 35),
        (250_000.0, 20),
        (290_000.0, 0),
    ] {
        let loan = loan_fixture(&farmer, amount);
        let (_, components) = score_application(&farmer, &loan, &assessment, &config);
        let ltv = components
            .iter()
            .find(|component| component.factor == ScoreFactor::LoanToValue)
            .expect("loan-to-value component present");
        assert_eq!(ltv.points, expected, "amount {amount}");
    }
}

#[test]
fn zero_acreage_yields_no_collateral_basis() {
    let config = UnderwritingConfig::default();
    let mut farmer = unbanked_farmer("score-no-land");
    farmer.land.total_area_acres = 0.0;
    let loan = loan_fixture(&farmer, 10_000.0);
    let assessment = assessment_with(33, 0.3, 0.7);

    let (_, components) = score_application(&farmer, &loan, &assessment, &config);

    let ltv = components
        .iter()
        .find(|component| component.factor == ScoreFactor::LoanToValue)
        .expect("loan-to-value component present");
    assert_eq!(ltv.points, 0);
    assert_eq!(ltv.notes, "no collateral basis on record");
}
