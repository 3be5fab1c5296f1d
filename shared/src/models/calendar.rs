//! Crop calendar models

use serde::{Deserialize, Serialize};

use crate::models::{ClimateSnapshot, ForecastDay};

/// One planned day of the crop cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day_index: u32,
    pub stage_name: String,
    pub tasks: Vec<String>,
    pub weather: ClimateSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
}

/// A farmer's day-indexed plan for the crop cycle.
///
/// `days` is ordered by `day_index` and covers
/// `[start_day, start_day + days.len() - 1]` without gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Calendar {
    pub start_day: u32,
    pub cycle_duration_days: u32,
    /// Farm climate at the time of the last generation or remake
    pub weather_baseline: ClimateSnapshot,
    pub days: Vec<CalendarDay>,
    /// Forecast the most recent build was planned against
    #[serde(default)]
    pub forecast_snapshot: Vec<ForecastDay>,
}

impl Calendar {
    /// Entry for `day_index`, if the calendar covers it
    pub fn day(&self, day_index: u32) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.day_index == day_index)
    }

    /// Entries strictly before `day_index`
    pub fn days_before(&self, day_index: u32) -> &[CalendarDay] {
        let end = self.days.partition_point(|d| d.day_index < day_index);
        &self.days[..end]
    }

    pub fn end_day(&self) -> Option<u32> {
        self.days.last().map(|d| d.day_index)
    }

    /// Tasks for `day_index`.
    ///
    /// When the day has no entry the task list is empty and the stage is that
    /// of the latest earlier day.
    pub fn today(&self, day_index: u32) -> TodayPlan {
        if let Some(entry) = self.day(day_index) {
            return TodayPlan {
                day_index,
                stage_name: entry.stage_name.clone(),
                tasks: entry.tasks.clone(),
                weather: Some(entry.weather.clone()),
            };
        }

        TodayPlan {
            day_index,
            stage_name: self
                .days_before(day_index)
                .last()
                .map(|d| d.stage_name.clone())
                .unwrap_or_default(),
            tasks: Vec::new(),
            weather: None,
        }
    }
}

/// What the farmer should do on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodayPlan {
    pub day_index: u32,
    pub stage_name: String,
    pub tasks: Vec<String>,
    pub weather: Option<ClimateSnapshot>,
}

/// A day as produced by the calendar builder, before weather is attached
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlannedDay {
    #[serde(default)]
    pub day_index: Option<u32>,
    #[serde(default)]
    pub stage_name: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
}
