use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::lending::credit::UnderwritingConfig;
use crate::workflows::lending::domain::{
    FarmerId, FarmerProfile, GeoPoint, IrrigationType, KycDocuments, LandHolding, LoanApplication,
    LoanId, LoanRequest, LoanStatus, LoanType, RegistryLink, Season,
};
use crate::workflows::lending::repository::{
    AssessmentRepository, FarmerRepository, LoanRepository, RepositoryError,
};
use crate::workflows::lending::risk::{RiskAssessment, RiskLevel, WeatherConditions};
use crate::workflows::lending::service::LendingService;
use crate::workflows::lending::signals::{
    AlternativeDataProvider, AlternativeSnapshot, CropHealth, MarketBalance, MarketProvider,
    MarketSnapshot, SatelliteProvider, SatelliteSnapshot, SignalError, WeatherDay,
    WeatherProvider, WeatherReading, WeatherSnapshot, FORECAST_DAYS,
};
use crate::workflows::lending::{AssessmentId, SignalHub};

pub(super) fn steady_weather() -> WeatherSnapshot {
    let forecast = (1..=FORECAST_DAYS as u8)
        .map(|day| WeatherDay {
            day,
            rainfall_mm: 50.0,
            temperature_c: 30.0,
            humidity_pct: 70.0,
            wind_speed_kmh: 10.0,
        })
        .collect();
    WeatherSnapshot {
        current: WeatherReading {
            rainfall_mm: 50.0,
            temperature_c: 30.0,
            humidity_pct: 70.0,
        },
        forecast,
        extreme_events: Vec::new(),
        drought_risk: 0.3,
        flood_risk: 0.2,
    }
}

pub(super) fn healthy_satellite() -> SatelliteSnapshot {
    SatelliteSnapshot {
        vegetation_index: 0.7,
        soil_moisture: 0.5,
        crop_health: CropHealth::Moderate,
        image_date: Utc::now(),
        anomalies: Vec::new(),
    }
}

pub(super) fn calm_market() -> MarketSnapshot {
    MarketSnapshot {
        crop_prices: Vec::new(),
        price_volatility: 0.2,
        demand_supply: MarketBalance::Balanced,
    }
}

pub(super) fn solid_alternative() -> AlternativeSnapshot {
    AlternativeSnapshot {
        registry_score: 0.8,
        digital_footprint: 0.6,
        social_score: 0.5,
        community_rating: 0.7,
    }
}

#[derive(Clone)]
pub(super) struct FixedWeather(pub(super) WeatherSnapshot);

impl WeatherProvider for FixedWeather {
    fn observe(&self, _location: GeoPoint) -> Result<WeatherSnapshot, SignalError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub(super) struct FixedSatellite(pub(super) SatelliteSnapshot);

impl SatelliteProvider for FixedSatellite {
    fn survey(&self, _location: GeoPoint) -> Result<SatelliteSnapshot, SignalError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub(super) struct FixedMarket(pub(super) MarketSnapshot);

impl MarketProvider for FixedMarket {
    fn quote(&self, _crops: &[String]) -> Result<MarketSnapshot, SignalError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub(super) struct FixedAlternative(pub(super) AlternativeSnapshot);

impl AlternativeDataProvider for FixedAlternative {
    fn assess(
        &self,
        _farmer_id: &FarmerId,
        _registry_verified: bool,
    ) -> Result<AlternativeSnapshot, SignalError> {
        Ok(self.0)
    }
}

pub(super) struct OfflineWeather;

impl WeatherProvider for OfflineWeather {
    fn observe(&self, _location: GeoPoint) -> Result<WeatherSnapshot, SignalError> {
        Err(SignalError::Timeout {
            provider: "weather",
        })
    }
}

pub(super) struct OfflineSatellite;

impl SatelliteProvider for OfflineSatellite {
    fn survey(&self, _location: GeoPoint) -> Result<SatelliteSnapshot, SignalError> {
        Err(SignalError::Upstream {
            provider: "satellite",
            message: "tile unavailable".to_string(),
        })
    }
}

pub(super) struct OfflineMarket;

impl MarketProvider for OfflineMarket {
    fn quote(&self, _crops: &[String]) -> Result<MarketSnapshot, SignalError> {
        Err(SignalError::Timeout { provider: "market" })
    }
}

pub(super) struct OfflineAlternative;

impl AlternativeDataProvider for OfflineAlternative {
    fn assess(
        &self,
        _farmer_id: &FarmerId,
        _registry_verified: bool,
    ) -> Result<AlternativeSnapshot, SignalError> {
        Err(SignalError::Timeout {
            provider: "alternative-data",
        })
    }
}

pub(super) fn fixed_hub() -> SignalHub {
    hub_with(
        steady_weather(),
        healthy_satellite(),
        calm_market(),
        solid_alternative(),
    )
}

pub(super) fn hub_with(
    weather: WeatherSnapshot,
    satellite: SatelliteSnapshot,
    market: MarketSnapshot,
    alternative: AlternativeSnapshot,
) -> SignalHub {
    SignalHub::new(
        Arc::new(FixedWeather(weather)),
        Arc::new(FixedSatellite(satellite)),
        Arc::new(FixedMarket(market)),
        Arc::new(FixedAlternative(alternative)),
    )
}

pub(super) fn offline_hub() -> SignalHub {
    SignalHub::new(
        Arc::new(OfflineWeather),
        Arc::new(OfflineSatellite),
        Arc::new(OfflineMarket),
        Arc::new(OfflineAlternative),
    )
}

pub(super) fn strong_farmer(suffix: &str) -> FarmerProfile {
    FarmerProfile {
        farmer_id: FarmerId(format!("farmer-{suffix}")),
        name: "Asha Patel".to_string(),
        coordinates: Some(GeoPoint {
            latitude: 23.0225,
            longitude: 72.5714,
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

pub(super) fn unbanked_farmer(suffix: &str) -> FarmerProfile {
    FarmerProfile {
        farmer_id: FarmerId(format!("farmer-{suffix}")),
        name: "Ravi Kumar".to_string(),
        coordinates: None,
        land: LandHolding {
            total_area_acres: 1.0,
            soil_type: "Sandy".to_string(),
            irrigation: IrrigationType::RainFed,
            crops: vec!["Millet".to_string()],
        },
        kyc: KycDocuments::default(),
        kyc_verified: false,
        registry: RegistryLink::default(),
        cooperative: None,
        credit_score: None,
    }
}

pub(super) fn working_capital_request(farmer: &FarmerProfile, amount: f64) -> LoanRequest {
    LoanRequest {
        farmer_id: farmer.farmer_id.clone(),
        loan_type: LoanType::WorkingCapitalCard,
        amount,
        purpose: "Input purchase".to_string(),
        crop: None,
        season: None,
        tenure_months: 12,
        interest_rate: Some(7.5),
    }
}

pub(super) fn crop_request(farmer: &FarmerProfile, amount: f64) -> LoanRequest {
    LoanRequest {
        farmer_id: farmer.farmer_id.clone(),
        loan_type: LoanType::CropSeason,
        amount,
        purpose: "Seed and fertilizer".to_string(),
        crop: Some("Wheat".to_string()),
        season: Some(Season::Kharif),
        tenure_months: 6,
        interest_rate: None,
    }
}

/// Stored loan in `PENDING`, for scorer and repayment tests that bypass the
/// service facade.
pub(super) fn loan_fixture(farmer: &FarmerProfile, amount: f64) -> LoanApplication {
    LoanApplication {
        loan_id: LoanId("LOAN-TEST-1".to_string()),
        farmer_id: farmer.farmer_id.clone(),
        loan_type: LoanType::WorkingCapitalCard,
        amount,
        purpose: "Input purchase".to_string(),
        crop: None,
        season: None,
        tenure_months: 12,
        interest_rate: 7.5,
        status: LoanStatus::Pending,
        application_date: chrono::NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date"),
        credit_decision: None,
        disbursement: None,
        repayment_schedule: Vec::new(),
        outstanding_amount: 0.0,
        risk_score: 0,
        insurance: None,
    }
}

/// Assessment built directly from snapshot pieces, for scorer/policy tests
/// that do not exercise the forecaster.
pub(super) fn assessment_with(
    overall: u8,
    drought_risk: f64,
    vegetation_index: f64,
) -> RiskAssessment {
    let mut satellite = healthy_satellite();
    satellite.vegetation_index = vegetation_index;

    RiskAssessment {
        assessment_id: AssessmentId("RISK-TEST-1".to_string()),
        farmer_id: FarmerId("farmer-test".to_string()),
        loan_id: None,
        assessed_at: Utc::now(),
        forward_risk: Vec::new(),
        weather: WeatherConditions {
            rainfall_mm: 50.0,
            temperature_c: 30.0,
            humidity_pct: 70.0,
            extreme_events: Vec::new(),
            drought_risk,
            flood_risk: 0.2,
        },
        satellite,
        market: calm_market(),
        alternative: solid_alternative(),
        overall_risk_score: overall,
        risk_category: RiskLevel::for_aggregate(overall),
        mitigation_actions: Vec::new(),
        insurance_triggers: Vec::new(),
    }
}

#[derive(Default)]
pub(super) struct MemoryFarmers {
    records: Mutex<HashMap<FarmerId, FarmerProfile>>,
}

impl FarmerRepository for MemoryFarmers {
    fn insert(&self, farmer: FarmerProfile) -> Result<FarmerProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("farmer mutex poisoned");
        if guard.contains_key(&farmer.farmer_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(farmer.farmer_id.clone(), farmer.clone());
        Ok(farmer)
    }

    fn update(&self, farmer: FarmerProfile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("farmer mutex poisoned");
        if guard.contains_key(&farmer.farmer_id) {
            guard.insert(farmer.farmer_id.clone(), farmer);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &FarmerId) -> Result<Option<FarmerProfile>, RepositoryError> {
        let guard = self.records.lock().expect("farmer mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryLoans {
    records: Mutex<HashMap<LoanId, LoanApplication>>,
}

impl MemoryLoans {
    pub(super) fn overwrite(&self, loan: LoanApplication) {
        let mut guard = self.records.lock().expect("loan mutex poisoned");
        guard.insert(loan.loan_id.clone(), loan);
    }
}

impl LoanRepository for MemoryLoans {
    fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("loan mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id.clone(), loan.clone());
        Ok(loan)
    }

    fn update(&self, loan: LoanApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("loan mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            guard.insert(loan.loan_id.clone(), loan);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("loan mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn in_status(&self, statuses: &[LoanStatus]) -> Result<Vec<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("loan mutex poisoned");
        Ok(guard
            .values()
            .filter(|loan| statuses.contains(&loan.status))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryAssessments {
    records: Mutex<Vec<RiskAssessment>>,
}

impl MemoryAssessments {
    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("assessment mutex poisoned").len()
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn append(&self, assessment: RiskAssessment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        guard.push(assessment);
        Ok(())
    }

    fn latest_for(&self, farmer_id: &FarmerId) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|assessment| &assessment.farmer_id == farmer_id)
            .cloned())
    }

    fn triggered_since(
        &self,
        since: chrono::DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|assessment| {
                assessment.assessed_at > since && !assessment.insurance_triggers.is_empty()
            })
            .cloned()
            .collect())
    }
}

/// Assessment store whose writes always fail, for persistence-propagation tests.
#[derive(Default)]
pub(super) struct BrokenAssessments;

impl AssessmentRepository for BrokenAssessments {
    fn append(&self, _assessment: RiskAssessment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn latest_for(
        &self,
        _farmer_id: &FarmerId,
    ) -> Result<Option<RiskAssessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn triggered_since(
        &self,
        _since: chrono::DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }
}

pub(super) type TestService = LendingService<MemoryFarmers, MemoryLoans, MemoryAssessments>;

pub(super) struct TestHarness {
    pub(super) service: Arc<TestService>,
    pub(super) farmers: Arc<MemoryFarmers>,
    pub(super) loans: Arc<MemoryLoans>,
    pub(super) assessments: Arc<MemoryAssessments>,
}

pub(super) fn harness() -> TestHarness {
    harness_with_config(UnderwritingConfig::default())
}

pub(super) fn harness_with_config(config: UnderwritingConfig) -> TestHarness {
    let farmers = Arc::new(MemoryFarmers::default());
    let loans = Arc::new(MemoryLoans::default());
    let assessments = Arc::new(MemoryAssessments::default());
    let service = Arc::new(LendingService::new(
        farmers.clone(),
        loans.clone(),
        assessments.clone(),
        fixed_hub(),
        config,
    ));

    TestHarness {
        service,
        farmers,
        loans,
        assessments,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
