//! Calendar regeneration policy
//!
//! Decides whether a farmer's stored calendar still fits the current farm
//! context. Checks run in a fixed order:
//!
//! 1. no calendar -> full regenerate
//! 2. disease analysis present -> full regenerate
//! 3. today's day not covered by the calendar -> full regenerate
//! 4. today's weather drifted past any threshold -> remake from today
//! 5. otherwise -> no-op
//!
//! The policy is pure. Building, merging and persisting belong to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::models::{Calendar, ClimateSnapshot, FarmContext};

/// Maximum tolerated drift between current and planned weather
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegenerationThresholds {
    pub temp_threshold_c: Decimal,
    pub humidity_threshold_pct: Decimal,
    pub rainfall_threshold_mm: Decimal,
}

impl Default for RegenerationThresholds {
    fn default() -> Self {
        Self {
            temp_threshold_c: Decimal::from(7),
            humidity_threshold_pct: Decimal::from(40),
            rainfall_threshold_mm: Decimal::from(20),
        }
    }
}

impl RegenerationThresholds {
    /// True if any component of `drift` is strictly above its threshold
    pub fn exceeded_by(&self, drift: &WeatherDrift) -> bool {
        drift.temperature_c > self.temp_threshold_c
            || drift.humidity_percent > self.humidity_threshold_pct
            || drift.rainfall_mm > self.rainfall_threshold_mm
    }
}

/// Absolute componentwise difference between two climate snapshots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherDrift {
    pub temperature_c: Decimal,
    pub humidity_percent: Decimal,
    pub rainfall_mm: Decimal,
}

impl WeatherDrift {
    pub fn between(current: &ClimateSnapshot, planned: &ClimateSnapshot) -> Self {
        Self {
            temperature_c: (current.temperature_c - planned.temperature_c).abs(),
            humidity_percent: (current.humidity_percent - planned.humidity_percent).abs(),
            rainfall_mm: (current.rainfall_mm - planned.rainfall_mm).abs(),
        }
    }
}

/// Free-text field analysis (e.g. from a leaf photo) attached to a request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DiseaseSignal(String);

impl DiseaseSignal {
    /// `None` for absent or blank analysis text
    pub fn from_optional(text: Option<&str>) -> Option<Self> {
        text.map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| DiseaseSignal(t.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Outcome of the regeneration policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "day", rename_all = "snake_case")]
pub enum RegenerationDecision {
    /// Stored calendar is still valid
    NoOp,
    /// Replace every day of the calendar
    FullRegenerate,
    /// Keep days before this one, rebuild it and everything after
    RemakeFrom(u32),
}

impl RegenerationDecision {
    /// First day the builder must produce, or `None` when nothing is built
    pub fn build_start_day(&self) -> Option<u32> {
        match self {
            RegenerationDecision::NoOp => None,
            RegenerationDecision::FullRegenerate => Some(1),
            RegenerationDecision::RemakeFrom(day) => Some(*day),
        }
    }

    pub fn requires_build(&self) -> bool {
        !matches!(self, RegenerationDecision::NoOp)
    }
}

impl std::fmt::Display for RegenerationDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegenerationDecision::NoOp => write!(f, "no-op"),
            RegenerationDecision::FullRegenerate => write!(f, "full regenerate"),
            RegenerationDecision::RemakeFrom(day) => write!(f, "remake from day {}", day),
        }
    }
}

/// Decide what to do with `existing` given the current farm context.
///
/// Fails with [`CalendarError::InvalidContext`] when the context has no
/// usable `day_of_cycle` or climate, before any other check.
pub fn decide(
    context: &FarmContext,
    existing: Option<&Calendar>,
    disease: Option<&DiseaseSignal>,
    thresholds: &RegenerationThresholds,
) -> Result<RegenerationDecision, CalendarError> {
    let day = context.current_day()?;
    let climate = context.current_climate()?;

    let Some(calendar) = existing else {
        return Ok(RegenerationDecision::FullRegenerate);
    };

    if disease.is_some_and(|d| !d.is_empty()) {
        return Ok(RegenerationDecision::FullRegenerate);
    }

    let Some(today) = calendar.day(day) else {
        return Ok(RegenerationDecision::FullRegenerate);
    };

    let drift = WeatherDrift::between(climate, &today.weather);
    if thresholds.exceeded_by(&drift) {
        Ok(RegenerationDecision::RemakeFrom(day))
    } else {
        Ok(RegenerationDecision::NoOp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarDay, CropSelection, Location, SoilSnapshot};
    use crate::types::Season;

    fn climate(t: i64, h: i64, r: i64) -> ClimateSnapshot {
        ClimateSnapshot::new(Decimal::from(t), Decimal::from(h), Decimal::from(r))
    }

    fn context(day: u32, current: ClimateSnapshot) -> FarmContext {
        FarmContext {
            location: Location {
                state: "Karnataka".to_string(),
                city: "Mysuru".to_string(),
                coordinates: None,
            },
            crop: CropSelection {
                name: "ragi".to_string(),
                season: Season::Kharif,
            },
            day_of_cycle: Some(day),
            soil: SoilSnapshot::default(),
            climate: Some(current),
        }
    }

    fn calendar_with_day5(weather: ClimateSnapshot) -> Calendar {
        Calendar {
            start_day: 1,
            cycle_duration_days: 10,
            weather_baseline: weather.clone(),
            days: (1..=10)
                .map(|i| CalendarDay {
                    day_index: i,
                    stage_name: "Vegetative".to_string(),
                    tasks: Vec::new(),
                    weather: weather.clone(),
                    weather_note: None,
                })
                .collect(),
            forecast_snapshot: Vec::new(),
        }
    }

    #[test]
    fn test_temperature_drift_remakes_from_today() {
        let cal = calendar_with_day5(climate(30, 60, 5));
        let ctx = context(5, climate(38, 62, 6));
        let decision = decide(&ctx, Some(&cal), None, &RegenerationThresholds::default());
        assert_eq!(decision, Ok(RegenerationDecision::RemakeFrom(5)));
    }

    #[test]
    fn test_drift_within_bounds_is_noop() {
        let cal = calendar_with_day5(climate(30, 60, 5));
        let ctx = context(5, climate(34, 62, 6));
        let decision = decide(&ctx, Some(&cal), None, &RegenerationThresholds::default());
        assert_eq!(decision, Ok(RegenerationDecision::NoOp));
    }

    #[test]
    fn test_drift_equal_to_threshold_is_noop() {
        let cal = calendar_with_day5(climate(30, 60, 5));
        let ctx = context(5, climate(37, 100, 25));
        let decision = decide(&ctx, Some(&cal), None, &RegenerationThresholds::default());
        assert_eq!(decision, Ok(RegenerationDecision::NoOp));
    }

    #[test]
    fn test_blank_disease_signal_is_ignored() {
        assert!(DiseaseSignal::from_optional(Some("   ")).is_none());
        assert!(DiseaseSignal::from_optional(None).is_none());
        assert_eq!(
            DiseaseSignal::from_optional(Some(" leaf blast ")).map(|d| d.as_str().to_string()),
            Some("leaf blast".to_string())
        );
    }

    #[test]
    fn test_invalid_context_checked_first() {
        let mut ctx = context(5, climate(30, 60, 5));
        ctx.climate = None;
        assert_eq!(
            decide(&ctx, None, None, &RegenerationThresholds::default()),
            Err(CalendarError::InvalidContext { field: "climate" })
        );
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&RegenerationDecision::RemakeFrom(5)).unwrap();
        assert_eq!(json, r#"{"outcome":"remake_from","day":5}"#);
        let json = serde_json::to_string(&RegenerationDecision::NoOp).unwrap();
        assert_eq!(json, r#"{"outcome":"no_op"}"#);
    }

    #[test]
    fn test_build_start_day() {
        assert_eq!(RegenerationDecision::NoOp.build_start_day(), None);
        assert_eq!(RegenerationDecision::FullRegenerate.build_start_day(), Some(1));
        assert_eq!(RegenerationDecision::RemakeFrom(9).build_start_day(), Some(9));
    }
}
