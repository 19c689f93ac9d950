use std::sync::Arc;

use agrilend::error::AppError;
use agrilend::workflows::lending::{
    ForwardRiskForecaster, FarmerId, FarmerProfile, GeoPoint, IrrigationType, KycDocuments,
    LandHolding, LendingService, LoanRequest, LoanType, RegistryLink, Season, UnderwritingConfig,
};
use chrono::{Local, NaiveDate};
use clap::Args;

use crate::infra::{
    simulated_signal_hub, InMemoryAssessmentStore, InMemoryFarmerRepository,
    InMemoryLoanRepository,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Loan amount for the demo application
    #[arg(long, default_value_t = 50_000.0)]
    pub(crate) amount: f64,
    /// Repayment tenure in months (ignored for crop-season loans)
    #[arg(long, default_value_t = 6)]
    pub(crate) tenure_months: u32,
    /// Apply for a crop-season loan instead of a working-capital card
    #[arg(long)]
    pub(crate) seasonal: bool,
    /// Skip the disbursement and repayment portion of the demo
    #[arg(long)]
    pub(crate) skip_repayment: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ForecastArgs {
    /// Assessment date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Latitude of the holding
    #[arg(long, default_value_t = 23.0225)]
    pub(crate) latitude: f64,
    /// Longitude of the holding
    #[arg(long, default_value_t = 72.5714)]
    pub(crate) longitude: f64,
}

fn demo_farmer(latitude: f64, longitude: f64) -> FarmerProfile {
    FarmerProfile {
        farmer_id: FarmerId("farmer-demo".to_string()),
        name: "Asha Patel".to_string(),
        coordinates: Some(GeoPoint {
            latitude,
            longitude,
        }),
        land: LandHolding {
            total_area_acres: 6.0,
            soil_type: "Black".to_string(),
            irrigation: IrrigationType::Drip,
            crops: vec!["Wheat".to_string(), "Cotton".to_string()],
        },
        kyc: KycDocuments {
            national_id: Some("AAD-1234".to_string()),
            tax_id: Some("PAN-5678".to_string()),
            land_records: Some("LR-91011".to_string()),
            bank_account: Some("ACC-1213".to_string()),
        },
        kyc_verified: true,
        registry: RegistryLink {
            registry_id: Some("AGRI-4455".to_string()),
            verified: true,
        },
        cooperative: Some("Green Valley FPO".to_string()),
        credit_score: None,
    }
}

pub(crate) fn run_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let ForecastArgs {
        today,
        latitude,
        longitude,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let farmer = demo_farmer(latitude, longitude);
    let forecaster = ForwardRiskForecaster::new(
        simulated_signal_hub(),
        UnderwritingConfig::default().default_location,
    );

    let assessment = forecaster.forecast(&farmer, None, today);

    println!("Forward risk forecast for {}", farmer.name);
    println!(
        "- Aggregate risk {} ({})",
        assessment.overall_risk_score,
        assessment.risk_category.label()
    );
    println!(
        "- Drought risk {:.2} | flood risk {:.2} | NDVI {:.2} | price volatility {:.2}",
        assessment.weather.drought_risk,
        assessment.weather.flood_risk,
        assessment.satellite.vegetation_index,
        assessment.market.price_volatility
    );
    println!("Daily series:");
    for point in &assessment.forward_risk {
        println!(
            "  day {:>2} ({}) -> {:>3} {}",
            point.day,
            point.date,
            point.risk_score,
            point.risk_level.label()
        );
    }

    if assessment.mitigation_actions.is_empty() {
        println!("Mitigation: none required");
    } else {
        println!("Mitigation:");
        for action in &assessment.mitigation_actions {
            println!("  - [{:?}] {}", action.priority, action.action);
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        amount,
        tenure_months,
        seasonal,
        skip_repayment,
    } = args;

    println!("Agri lending demo");

    let service = Arc::new(LendingService::new(
        Arc::new(InMemoryFarmerRepository::default()),
        Arc::new(InMemoryLoanRepository::default()),
        Arc::new(InMemoryAssessmentStore::default()),
        simulated_signal_hub(),
        UnderwritingConfig::default(),
    ));

    let farmer = service.register_farmer(demo_farmer(23.0225, 72.5714))?;
    println!("- Registered borrower {} ({})", farmer.name, farmer.farmer_id);

    let request = LoanRequest {
        farmer_id: farmer.farmer_id.clone(),
        loan_type: if seasonal {
            LoanType::CropSeason
        } else {
            LoanType::WorkingCapitalCard
        },
        amount,
        purpose: "Input purchase".to_string(),
        crop: seasonal.then(|| "Wheat".to_string()),
        season: seasonal.then_some(Season::Kharif),
        tenure_months,
        interest_rate: None,
    };
    let loan = service.apply(request)?;
    println!(
        "- Application {} for {} ({:.0}) -> status {}",
        loan.loan_id,
        loan.loan_type.label(),
        loan.amount,
        loan.status
    );

    let decision = service.decide(&loan.loan_id)?;
    println!(
        "- Decision: {} in {} ms",
        decision.summary(),
        decision.decision_time_ms
    );
    println!(
        "  Credit score {} | risk level {}",
        decision.score,
        decision.risk_level.label()
    );

    let assessment = service
        .latest_assessment(&farmer.farmer_id)?
        .ok_or_else(|| AppError::Io(std::io::Error::other("assessment missing after decision")))?;
    println!(
        "  Aggregate forward risk {} over {} days",
        assessment.overall_risk_score,
        assessment.forward_risk.len()
    );

    if skip_repayment {
        return Ok(());
    }

    let disbursed = match service.disburse(&loan.loan_id, "DEMO-ACC-0001") {
        Ok(loan) => loan,
        Err(err) => {
            println!("- Disbursement unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "- Disbursed {:.0} via {}",
        disbursed.amount,
        disbursed
            .disbursement
            .as_ref()
            .map(|record| record.transaction_id.as_str())
            .unwrap_or("unknown")
    );
    println!("  Repayment schedule:");
    for installment in &disbursed.repayment_schedule {
        println!(
            "    {} -> {:.2} (principal {:.2}, interest {:.2})",
            installment.due_date, installment.amount, installment.principal, installment.interest
        );
    }

    let first = disbursed.repayment_schedule[0].amount;
    let after = service.record_payment(&loan.loan_id, first, Local::now().date_naive())?;
    println!(
        "- Paid first installment {:.2} -> status {} | outstanding {:.2}",
        first, after.status, after.outstanding_amount
    );

    Ok(())
}
