//! Randomized stand-ins for the live data providers.
//!
//! Distributions match what the eventual upstream integrations are expected to
//! return: rainfall 0–100 mm/day, NDVI 0.6–0.9, price volatility 0–0.3, and
//! alternative scores 0.5–1.0. The drought and flood flags are derived from the
//! generated forward series, not drawn independently.

use chrono::Utc;
use rand::Rng;

use super::{
    AlternativeDataProvider, AlternativeSnapshot, CropHealth, CropQuote, MarketBalance,
    MarketProvider, MarketSnapshot, PriceTrend, SatelliteProvider, SatelliteSnapshot, SignalError,
    WeatherDay, WeatherProvider, WeatherReading, WeatherSnapshot, FORECAST_DAYS,
};
use crate::workflows::lending::domain::{FarmerId, GeoPoint};

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedWeatherProvider;

impl WeatherProvider for SimulatedWeatherProvider {
    fn observe(&self, _location: GeoPoint) -> Result<WeatherSnapshot, SignalError> {
        let mut rng = rand::thread_rng();

        let current = WeatherReading {
            rainfall_mm: rng.gen::<f64>() * 100.0,
            temperature_c: 25.0 + rng.gen::<f64>() * 15.0,
            humidity_pct: 60.0 + rng.gen::<f64>() * 30.0,
        };

        let forecast: Vec<WeatherDay> = (1..=FORECAST_DAYS as u8)
            .map(|day| WeatherDay {
                day,
                rainfall_mm: rng.gen::<f64>() * 100.0,
                temperature_c: 25.0 + rng.gen::<f64>() * 15.0,
                humidity_pct: 60.0 + rng.gen::<f64>() * 30.0,
                wind_speed_kmh: rng.gen::<f64>() * 30.0,
            })
            .collect();

        let extreme_events = forecast
            .iter()
            .filter(|day| day.rainfall_mm > 80.0)
            .map(|day| format!("Heavy rainfall on day {}", day.day))
            .collect();
        let dry_days = forecast.iter().filter(|day| day.rainfall_mm < 10.0).count();
        let heavy_days = forecast.iter().filter(|day| day.rainfall_mm > 80.0).count();

        Ok(WeatherSnapshot {
            current,
            forecast,
            extreme_events,
            drought_risk: if dry_days > 5 { 0.7 } else { 0.3 },
            flood_risk: if heavy_days > 3 { 0.6 } else { 0.2 },
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSatelliteProvider;

impl SatelliteProvider for SimulatedSatelliteProvider {
    fn survey(&self, _location: GeoPoint) -> Result<SatelliteSnapshot, SignalError> {
        let mut rng = rand::thread_rng();

        let vegetation_index = 0.6 + rng.gen::<f64>() * 0.3;
        let crop_health = match rng.gen::<f64>() {
            roll if roll > 0.7 => CropHealth::Good,
            roll if roll > 0.4 => CropHealth::Moderate,
            _ => CropHealth::Poor,
        };
        let anomalies = if rng.gen::<f64>() > 0.8 {
            vec!["Low vegetation detected".to_string()]
        } else {
            Vec::new()
        };

        Ok(SatelliteSnapshot {
            vegetation_index,
            soil_moisture: 0.3 + rng.gen::<f64>() * 0.4,
            crop_health,
            image_date: Utc::now(),
            anomalies,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedMarketProvider;

impl MarketProvider for SimulatedMarketProvider {
    fn quote(&self, crops: &[String]) -> Result<MarketSnapshot, SignalError> {
        let mut rng = rand::thread_rng();

        let crop_prices = crops
            .iter()
            .map(|crop| CropQuote {
                crop: crop.clone(),
                price: 2000.0 + rng.gen::<f64>() * 3000.0,
                trend: if rng.gen_bool(0.5) {
                    PriceTrend::Up
                } else {
                    PriceTrend::Down
                },
            })
            .collect();

        Ok(MarketSnapshot {
            crop_prices,
            price_volatility: rng.gen::<f64>() * 0.3,
            demand_supply: if rng.gen_bool(0.5) {
                MarketBalance::Balanced
            } else {
                MarketBalance::Oversupply
            },
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAlternativeDataProvider;

impl AlternativeDataProvider for SimulatedAlternativeDataProvider {
    fn assess(
        &self,
        _farmer_id: &FarmerId,
        registry_verified: bool,
    ) -> Result<AlternativeSnapshot, SignalError> {
        let mut rng = rand::thread_rng();

        Ok(AlternativeSnapshot {
            registry_score: if registry_verified { 0.8 } else { 0.5 },
            digital_footprint: 0.5 + rng.gen::<f64>() * 0.5,
            social_score: 0.5 + rng.gen::<f64>() * 0.5,
            community_rating: 0.5 + rng.gen::<f64>() * 0.5,
        })
    }
}
