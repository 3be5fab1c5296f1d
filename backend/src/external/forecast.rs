//! Daily forecast client
//!
//! Integrates with the Open-Meteo daily forecast API. Provides up to
//! [`FORECAST_HORIZON_DAYS`] days of mean temperature, mean humidity and
//! precipitation for a farm's coordinates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{ForecastDay, GpsCoordinates, FORECAST_HORIZON_DAYS};

use crate::config::ForecastConfig;
use crate::error::{AppError, AppResult};

/// Open-Meteo forecast client
#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
    forecast_days: u32,
}

/// Open-Meteo daily forecast response
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    daily: Option<OpenMeteoDaily>,
}

/// Column-oriented daily values. Any entry may be null.
#[derive(Debug, Default, Deserialize)]
struct OpenMeteoDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

/// Supplies daily forecasts for a calendar build
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn daily_forecast(&self, coordinates: &GpsCoordinates) -> AppResult<Vec<ForecastDay>>;
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn daily_forecast(&self, coordinates: &GpsCoordinates) -> AppResult<Vec<ForecastDay>> {
        self.get_daily_forecast(coordinates).await
    }
}

impl ForecastClient {
    pub fn new(config: &ForecastConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days.clamp(1, FORECAST_HORIZON_DAYS),
        })
    }

    /// Fetch the daily forecast starting today at the given coordinates
    pub async fn get_daily_forecast(
        &self,
        coordinates: &GpsCoordinates,
    ) -> AppResult<Vec<ForecastDay>> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}\
             &daily=temperature_2m_max,temperature_2m_min,relative_humidity_2m_mean,precipitation_sum\
             &forecast_days={}&timezone=auto",
            self.base_url, coordinates.lat, coordinates.lon, self.forecast_days
        );

        tracing::debug!(lat = %coordinates.lat, lon = %coordinates.lon, "Fetching daily forecast");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ForecastService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ForecastService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let data: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| AppError::ForecastService(format!("Failed to parse response: {}", e)))?;

        let days = convert_daily(data.daily.unwrap_or_default());
        tracing::debug!(days = days.len(), "Forecast received");
        Ok(days)
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value)
}

fn value_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Row-wise forecast: mean of max/min temperature, truncated humidity and
/// rainfall, both temperatures and rainfall rounded to one decimal place
fn convert_daily(daily: OpenMeteoDaily) -> Vec<ForecastDay> {
    let rows = daily.time.len().min(FORECAST_HORIZON_DAYS as usize);

    (0..rows)
        .map(|i| {
            let temperature_c = match (
                value_at(&daily.temperature_2m_max, i),
                value_at(&daily.temperature_2m_min, i),
            ) {
                (Some(max), Some(min)) => to_decimal((max + min) / 2.0).map(|t| t.round_dp(1)),
                _ => None,
            };
            ForecastDay {
                temperature_c,
                humidity_percent: value_at(&daily.relative_humidity_2m_mean, i)
                    .and_then(to_decimal)
                    .map(|h| h.trunc()),
                rainfall_mm: value_at(&daily.precipitation_sum, i)
                    .and_then(to_decimal)
                    .map(|r| r.round_dp(1)),
            }
        })
        .collect()
}
