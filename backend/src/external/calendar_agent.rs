//! Calendar builder agent client
//!
//! The agent turns a farm context, a crop profile and a forecast into
//! day-by-day stages and tasks. Its output is normalized before it is stored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{CalendarDay, CropProfile, FarmContext, ForecastDay, PlannedDay};

use crate::config::AgentConfig;
use crate::error::{AppError, AppResult};

/// Everything the builder needs to plan `[start_day, cycle_duration_days]`
#[derive(Debug, Clone, Serialize)]
pub struct BuildCalendarRequest {
    pub context: FarmContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_profile: Option<CropProfile>,
    pub forecast: Vec<ForecastDay>,
    pub cycle_duration_days: u32,
    pub start_day: u32,
    /// Days kept from the prior calendar on a remake
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub past_days: Vec<CalendarDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_analysis: Option<String>,
}

impl BuildCalendarRequest {
    pub fn days_requested(&self) -> u32 {
        (self.cycle_duration_days + 1).saturating_sub(self.start_day)
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildCalendarResponse {
    #[serde(default)]
    pub days: Vec<PlannedDay>,
}

/// Produces planned days for a calendar build
#[async_trait]
pub trait CalendarBuilder: Send + Sync {
    async fn build(&self, request: &BuildCalendarRequest) -> AppResult<Vec<PlannedDay>>;
}

/// HTTP client for the calendar builder agent
#[derive(Clone)]
pub struct AgentCalendarClient {
    api_endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

impl AgentCalendarClient {
    pub fn new(config: &AgentConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            http_client,
        })
    }
}

#[async_trait]
impl CalendarBuilder for AgentCalendarClient {
    async fn build(&self, request: &BuildCalendarRequest) -> AppResult<Vec<PlannedDay>> {
        let url = format!("{}/calendar/build", self.api_endpoint);

        tracing::info!(
            start_day = request.start_day,
            days = request.days_requested(),
            "Requesting calendar build"
        );

        let mut builder = self.http_client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::CalendarAgent(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::CalendarAgent(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: BuildCalendarResponse = response
            .json()
            .await
            .map_err(|e| AppError::CalendarAgent(format!("Failed to parse response: {}", e)))?;

        if result.days.len() as u32 != request.days_requested() {
            tracing::warn!(
                expected = request.days_requested(),
                received = result.days.len(),
                "Calendar agent returned unexpected number of days"
            );
        }

        Ok(result.days)
    }
}
