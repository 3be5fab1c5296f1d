//! Configuration management for the Crop Calendar service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CROPCAL_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::RegenerationThresholds;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Regeneration policy settings
    pub calendar: CalendarConfig,

    /// Calendar builder agent
    pub agent: AgentConfig,

    /// Daily forecast provider
    pub forecast: ForecastConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    /// Max tolerated temperature drift in °C
    pub temp_threshold_c: Decimal,

    /// Max tolerated humidity drift in percentage points
    pub humidity_threshold_pct: Decimal,

    /// Max tolerated rainfall drift in mm
    pub rainfall_threshold_mm: Decimal,

    /// Cycle length when the crop profile has none
    pub default_cycle_duration_days: u32,
}

impl CalendarConfig {
    pub fn thresholds(&self) -> RegenerationThresholds {
        RegenerationThresholds {
            temp_threshold_c: self.temp_threshold_c,
            humidity_threshold_pct: self.humidity_threshold_pct,
            rainfall_threshold_mm: self.rainfall_threshold_mm,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Base URL of the calendar builder agent
    pub endpoint: String,

    pub api_key: Option<String>,

    /// Building a whole cycle can take minutes
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Open-Meteo API base URL
    pub endpoint: String,

    pub forecast_days: u32,

    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CROPCAL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("calendar.temp_threshold_c", "7")?
            .set_default("calendar.humidity_threshold_pct", "40")?
            .set_default("calendar.rainfall_threshold_mm", "20")?
            .set_default("calendar.default_cycle_duration_days", 120)?
            .set_default("agent.endpoint", "http://127.0.0.1:8000")?
            .set_default("agent.timeout_secs", 300)?
            .set_default("forecast.endpoint", "https://api.open-meteo.com/v1")?
            .set_default("forecast.forecast_days", 16)?
            .set_default("forecast.timeout_secs", 20)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CROPCAL_ prefix)
            .add_source(
                Environment::with_prefix("CROPCAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        shared::validate_thresholds(&self.calendar.thresholds())
            .map_err(|msg| ConfigError::Message(msg.to_string()))?;
        if self.calendar.default_cycle_duration_days == 0 {
            return Err(ConfigError::Message(
                "calendar.default_cycle_duration_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar_config(temp: i64) -> CalendarConfig {
        CalendarConfig {
            temp_threshold_c: Decimal::from(temp),
            humidity_threshold_pct: Decimal::from(40),
            rainfall_threshold_mm: Decimal::from(20),
            default_cycle_duration_days: 120,
        }
    }

    #[test]
    fn test_thresholds_from_config() {
        assert_eq!(
            calendar_config(7).thresholds(),
            RegenerationThresholds::default()
        );
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/cropcal".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            calendar: calendar_config(-1),
            agent: AgentConfig {
                endpoint: "http://127.0.0.1:8000".to_string(),
                api_key: None,
                timeout_secs: 1,
            },
            forecast: ForecastConfig {
                endpoint: "http://127.0.0.1:9000".to_string(),
                forecast_days: 16,
                timeout_secs: 1,
            },
        };
        assert!(config.validate().is_err());
    }
}
