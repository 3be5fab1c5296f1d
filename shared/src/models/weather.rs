//! Weather data models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of days covered by the daily forecast
pub const FORECAST_HORIZON_DAYS: u32 = 16;

/// Temperature, humidity and rainfall at one point in time.
///
/// Used both for the farm's current conditions and for the weather a
/// calendar day was planned against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClimateSnapshot {
    pub temperature_c: Decimal,
    pub humidity_percent: Decimal,
    pub rainfall_mm: Decimal,
}

impl ClimateSnapshot {
    pub fn new(temperature_c: Decimal, humidity_percent: Decimal, rainfall_mm: Decimal) -> Self {
        Self {
            temperature_c,
            humidity_percent,
            rainfall_mm,
        }
    }
}

/// One day of the provider forecast. Any component may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastDay {
    pub temperature_c: Option<Decimal>,
    pub humidity_percent: Option<Decimal>,
    pub rainfall_mm: Option<Decimal>,
}

impl ForecastDay {
    /// Complete this forecast with `fallback` for every missing component
    pub fn resolve(&self, fallback: &ClimateSnapshot) -> ClimateSnapshot {
        ClimateSnapshot {
            temperature_c: self.temperature_c.unwrap_or(fallback.temperature_c),
            humidity_percent: self.humidity_percent.unwrap_or(fallback.humidity_percent),
            rainfall_mm: self.rainfall_mm.unwrap_or(fallback.rainfall_mm),
        }
    }
}

/// Expected weather for a cycle day.
///
/// Days inside the forecast horizon take their own forecast entry; later days
/// repeat the last entry of the horizon.
pub fn weather_for_day(
    forecast: &[ForecastDay],
    day_index: u32,
    fallback: &ClimateSnapshot,
) -> ClimateSnapshot {
    let Some(last) = forecast.get(forecast.len().min(FORECAST_HORIZON_DAYS as usize).saturating_sub(1))
    else {
        return fallback.clone();
    };

    let day = day_index as usize;
    let entry = if day >= 1 && day <= FORECAST_HORIZON_DAYS as usize && day <= forecast.len() {
        &forecast[day - 1]
    } else {
        last
    };
    entry.resolve(fallback)
}
