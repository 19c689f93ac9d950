//! 15-day forward risk forecasting.
//!
//! The forecaster combines the four signal snapshots into a daily risk series
//! plus an aggregate score and category. It is deterministic over its snapshots:
//! the stored assessment always reproduces its own score, which is what makes
//! the history auditable.

pub mod mitigation;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, FarmerId, FarmerProfile, GeoPoint, LoanId};
use super::signals::{
    AlternativeSnapshot, MarketSnapshot, SatelliteSnapshot, SignalBundle, SignalHub,
    WeatherSnapshot, FORECAST_DAYS,
};
use mitigation::{InsuranceTrigger, MitigationAction};

/// Risk banding shared by daily points, aggregates, and credit decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Banding for a single forecast day. Boundaries are strictly greater-than.
    pub fn for_day(score: u8) -> Self {
        match score {
            s if s > 70 => RiskLevel::Critical,
            s if s > 50 => RiskLevel::High,
            s if s > 30 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Banding for the aggregate score. A score of exactly 75 is still `High`.
    pub fn for_aggregate(score: u8) -> Self {
        match score {
            s if s > 75 => RiskLevel::Critical,
            s if s > 50 => RiskLevel::High,
            s if s > 30 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Per-factor contribution behind a daily score, scaled to 0–100 for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFactors {
    pub weather: u8,
    pub market: u8,
    pub satellite: u8,
    pub seasonal: u8,
}

/// One day of the forward risk series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRiskPoint {
    /// 1-based offset from the assessment date.
    pub day: u8,
    pub date: NaiveDate,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub factors: DayFactors,
}

/// Weather conditions snapshotted onto the assessment for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub extreme_events: Vec<String>,
    pub drought_risk: f64,
    pub flood_risk: f64,
}

impl WeatherConditions {
    fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self {
            rainfall_mm: snapshot.current.rainfall_mm,
            temperature_c: snapshot.current.temperature_c,
            humidity_pct: snapshot.current.humidity_pct,
            extreme_events: snapshot.extreme_events.clone(),
            drought_risk: snapshot.drought_risk,
            flood_risk: snapshot.flood_risk,
        }
    }
}

/// Immutable record of one forecast invocation. History is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub assessment_id: AssessmentId,
    pub farmer_id: FarmerId,
    pub loan_id: Option<LoanId>,
    pub assessed_at: DateTime<Utc>,
    pub forward_risk: Vec<DailyRiskPoint>,
    pub weather: WeatherConditions,
    pub satellite: SatelliteSnapshot,
    pub market: MarketSnapshot,
    pub alternative: AlternativeSnapshot,
    pub overall_risk_score: u8,
    pub risk_category: RiskLevel,
    pub mitigation_actions: Vec<MitigationAction>,
    pub insurance_triggers: Vec<InsuranceTrigger>,
}

/// Combines the signal providers into a 15-day forward risk assessment.
#[derive(Clone)]
pub struct ForwardRiskForecaster {
    hub: SignalHub,
    default_location: GeoPoint,
}

impl ForwardRiskForecaster {
    pub fn new(hub: SignalHub, default_location: GeoPoint) -> Self {
        Self {
            hub,
            default_location,
        }
    }

    /// Produce an assessment for the borrower. Always yields exactly
    /// [`FORECAST_DAYS`] points with dates starting tomorrow; provider outages
    /// degrade to fallback snapshots inside the hub rather than failing.
    pub fn forecast(
        &self,
        farmer: &FarmerProfile,
        loan_id: Option<&LoanId>,
        today: NaiveDate,
    ) -> RiskAssessment {
        let location = farmer.coordinates.unwrap_or(self.default_location);
        let signals = self.hub.gather(
            location,
            &farmer.land.crops,
            &farmer.farmer_id,
            farmer.registry.verified,
        );

        self.assess_from_signals(farmer, loan_id, today, signals)
    }

    /// Deterministic core: compute the assessment from an explicit signal
    /// bundle. Exposed so the stored snapshot can be re-scored for audit.
    pub fn assess_from_signals(
        &self,
        farmer: &FarmerProfile,
        loan_id: Option<&LoanId>,
        today: NaiveDate,
        signals: SignalBundle,
    ) -> RiskAssessment {
        let SignalBundle {
            weather,
            satellite,
            market,
            alternative,
        } = signals;

        let forward_risk: Vec<DailyRiskPoint> = (1..=FORECAST_DAYS as u8)
            .map(|day| {
                let rainfall = weather
                    .forecast
                    .get(day as usize - 1)
                    .map(|entry| entry.rainfall_mm)
                    .unwrap_or(50.0);
                day_risk(day, rainfall, &market, &satellite, today)
            })
            .collect();

        let overall_risk_score = aggregate_score(&forward_risk, &weather, &satellite, &market, &alternative);
        let risk_category = RiskLevel::for_aggregate(overall_risk_score);

        let conditions = WeatherConditions::from_snapshot(&weather);
        let (mitigation_actions, insurance_triggers) =
            mitigation::advise(&conditions, &satellite, &market, overall_risk_score);

        RiskAssessment {
            assessment_id: AssessmentId(format!(
                "RISK-{}-{}",
                Utc::now().timestamp_millis(),
                farmer.farmer_id
            )),
            farmer_id: farmer.farmer_id.clone(),
            loan_id: loan_id.cloned(),
            assessed_at: Utc::now(),
            forward_risk,
            weather: conditions,
            satellite,
            market,
            alternative,
            overall_risk_score,
            risk_category,
            mitigation_actions,
            insurance_triggers,
        }
    }
}

fn day_risk(
    day: u8,
    rainfall_mm: f64,
    market: &MarketSnapshot,
    satellite: &SatelliteSnapshot,
    today: NaiveDate,
) -> DailyRiskPoint {
    let weather_risk = if rainfall_mm > 80.0 {
        0.8
    } else if rainfall_mm < 10.0 {
        0.6
    } else {
        0.3
    };
    let market_risk = market.price_volatility;
    let satellite_risk = if satellite.vegetation_index < 0.5 {
        0.7
    } else {
        0.3
    };
    let seasonal_risk = (day as f64 / FORECAST_DAYS as f64 * std::f64::consts::PI).sin() * 0.2 + 0.3;

    let composite =
        weather_risk * 0.4 + market_risk * 0.3 + satellite_risk * 0.2 + seasonal_risk * 0.1;
    let risk_score = (composite * 100.0).round().clamp(0.0, 100.0) as u8;

    DailyRiskPoint {
        day,
        date: today + Duration::days(day as i64),
        risk_score,
        risk_level: RiskLevel::for_day(risk_score),
        factors: DayFactors {
            weather: (weather_risk * 100.0).round() as u8,
            market: (market_risk * 100.0).round().clamp(0.0, 100.0) as u8,
            satellite: (satellite_risk * 100.0).round() as u8,
            seasonal: (seasonal_risk * 100.0).round() as u8,
        },
    }
}

fn aggregate_score(
    forward_risk: &[DailyRiskPoint],
    weather: &WeatherSnapshot,
    satellite: &SatelliteSnapshot,
    market: &MarketSnapshot,
    alternative: &AlternativeSnapshot,
) -> u8 {
    let mean_forward = forward_risk
        .iter()
        .map(|point| point.risk_score as f64)
        .sum::<f64>()
        / forward_risk.len().max(1) as f64;
    let weather_term = 100.0 * (weather.drought_risk + weather.flood_risk);
    let satellite_term = 100.0 * (1.0 - satellite.vegetation_index);
    let market_term = 100.0 * market.price_volatility;
    let alt_term =
        100.0 * (1.0 - (alternative.registry_score + alternative.digital_footprint) / 2.0);

    let weighted = mean_forward * 0.4
        + weather_term * 0.25
        + satellite_term * 0.15
        + market_term * 0.10
        + alt_term * 0.10;

    weighted.round().clamp(0.0, 100.0) as u8
}
