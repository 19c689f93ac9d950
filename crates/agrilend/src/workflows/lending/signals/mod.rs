//! Signal ingestion for the risk engine.
//!
//! Each external data source sits behind a capability trait with a documented
//! contract (ranges and units), so the simulated stubs in [`simulated`] can be
//! swapped for real clients without touching the scoring logic. Provider outages
//! never fail a forecast: the [`SignalHub`] substitutes fixed fallback snapshots
//! and logs a warning.

pub mod simulated;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::domain::{FarmerId, GeoPoint};

/// Number of forward days every weather forecast and risk series covers.
pub const FORECAST_DAYS: usize = 15;

/// Point-in-time weather observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Millimetres over the observation window.
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// One day of the forward weather series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    /// 1-based offset from the assessment date.
    pub day: u8,
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
}

/// Current conditions plus a 15-day forward series and derived risk flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: WeatherReading,
    pub forecast: Vec<WeatherDay>,
    pub extreme_events: Vec<String>,
    /// 0–1, derived from the count of dry forecast days.
    pub drought_risk: f64,
    /// 0–1, derived from the count of heavy-rainfall forecast days.
    pub flood_risk: f64,
}

impl WeatherSnapshot {
    /// Fixed substitute used when the weather provider is unavailable.
    pub fn fallback() -> Self {
        let forecast = (1..=FORECAST_DAYS as u8)
            .map(|day| WeatherDay {
                day,
                rainfall_mm: 50.0,
                temperature_c: 30.0,
                humidity_pct: 70.0,
                wind_speed_kmh: 10.0,
            })
            .collect();
        Self {
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
}

/// Qualitative crop-health label derived from imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropHealth {
    Good,
    Moderate,
    Poor,
}

/// Remote-imagery snapshot for the holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSnapshot {
    /// NDVI-proxy, 0–1.
    pub vegetation_index: f64,
    /// Volumetric fraction, 0–1.
    pub soil_moisture: f64,
    pub crop_health: CropHealth,
    pub image_date: DateTime<Utc>,
    pub anomalies: Vec<String>,
}

impl SatelliteSnapshot {
    /// Fixed substitute used when the imagery provider is unavailable.
    pub fn fallback() -> Self {
        Self {
            vegetation_index: 0.7,
            soil_moisture: 0.5,
            crop_health: CropHealth::Moderate,
            image_date: Utc::now(),
            anomalies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceTrend {
    Up,
    Down,
}

/// Per-crop market quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropQuote {
    pub crop: String,
    /// Price per quintal in local currency.
    pub price: f64,
    pub trend: PriceTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketBalance {
    Balanced,
    Oversupply,
}

/// Mandi price snapshot across the borrower's crops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub crop_prices: Vec<CropQuote>,
    /// Aggregate price volatility, 0–1.
    pub price_volatility: f64,
    pub demand_supply: MarketBalance,
}

impl MarketSnapshot {
    /// Fixed substitute used when the market provider is unavailable.
    pub fn fallback() -> Self {
        Self {
            crop_prices: Vec::new(),
            price_volatility: 0.15,
            demand_supply: MarketBalance::Balanced,
        }
    }
}

/// Normalized alternative-data scores, all 0–1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSnapshot {
    /// Farm-registry verification strength.
    pub registry_score: f64,
    pub digital_footprint: f64,
    pub social_score: f64,
    pub community_rating: f64,
}

impl AlternativeSnapshot {
    /// Fixed substitute used when the alternative-data provider is unavailable.
    pub fn fallback() -> Self {
        Self {
            registry_score: 0.5,
            digital_footprint: 0.5,
            social_score: 0.5,
            community_rating: 0.5,
        }
    }
}

/// Provider failure surfaced to the hub; never propagated past it.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("{provider} provider timed out")]
    Timeout { provider: &'static str },
    #[error("{provider} provider error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },
}

pub trait WeatherProvider: Send + Sync {
    fn observe(&self, location: GeoPoint) -> Result<WeatherSnapshot, SignalError>;
}

pub trait SatelliteProvider: Send + Sync {
    fn survey(&self, location: GeoPoint) -> Result<SatelliteSnapshot, SignalError>;
}

pub trait MarketProvider: Send + Sync {
    fn quote(&self, crops: &[String]) -> Result<MarketSnapshot, SignalError>;
}

pub trait AlternativeDataProvider: Send + Sync {
    fn assess(
        &self,
        farmer_id: &FarmerId,
        registry_verified: bool,
    ) -> Result<AlternativeSnapshot, SignalError>;
}

/// All four snapshots gathered for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub weather: WeatherSnapshot,
    pub satellite: SatelliteSnapshot,
    pub market: MarketSnapshot,
    pub alternative: AlternativeSnapshot,
}

/// Bundles the four providers and degrades to fallbacks on any provider error.
#[derive(Clone)]
pub struct SignalHub {
    weather: Arc<dyn WeatherProvider>,
    satellite: Arc<dyn SatelliteProvider>,
    market: Arc<dyn MarketProvider>,
    alternative: Arc<dyn AlternativeDataProvider>,
}

impl SignalHub {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        satellite: Arc<dyn SatelliteProvider>,
        market: Arc<dyn MarketProvider>,
        alternative: Arc<dyn AlternativeDataProvider>,
    ) -> Self {
        Self {
            weather,
            satellite,
            market,
            alternative,
        }
    }

    /// Gather every signal for an assessment. Provider failures are replaced by
    /// the documented fallback constants.
    pub fn gather(
        &self,
        location: GeoPoint,
        crops: &[String],
        farmer_id: &FarmerId,
        registry_verified: bool,
    ) -> SignalBundle {
        let weather = self.weather.observe(location).unwrap_or_else(|err| {
            warn!(%err, "weather provider unavailable, using fallback snapshot");
            WeatherSnapshot::fallback()
        });
        let satellite = self.satellite.survey(location).unwrap_or_else(|err| {
            warn!(%err, "satellite provider unavailable, using fallback snapshot");
            SatelliteSnapshot::fallback()
        });
        let market = self.market.quote(crops).unwrap_or_else(|err| {
            warn!(%err, "market provider unavailable, using fallback snapshot");
            MarketSnapshot::fallback()
        });
        let alternative = self
            .alternative
            .assess(farmer_id, registry_verified)
            .unwrap_or_else(|err| {
                warn!(%err, "alternative-data provider unavailable, using fallback snapshot");
                AlternativeSnapshot::fallback()
            });

        SignalBundle {
            weather,
            satellite,
            market,
            alternative,
        }
    }
}
