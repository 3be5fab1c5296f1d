//! Turning calendar builder output into calendar days

use crate::error::CalendarError;
use crate::models::{weather_for_day, CalendarDay, ClimateSnapshot, ForecastDay, PlannedDay};

/// Stage name for days the builder left out
pub const UNKNOWN_STAGE: &str = "Unknown";

/// Task for days the builder left out
pub const PLACEHOLDER_TASK: &str = "See previous/next stage for context.";

/// Days from this index onward carry an outlook note instead of a forecast
pub const OUTLOOK_FROM_DAY: u32 = 47;

pub const OUTLOOK_NOTE: &str = "See seasonal outlook for this period.";

/// Make builder output cover exactly `[start_day, cycle_duration_days]`.
///
/// Extra days are dropped, missing days are padded with placeholders and
/// every entry is re-indexed by position.
pub fn normalize_planned_days(
    mut planned: Vec<PlannedDay>,
    start_day: u32,
    cycle_duration_days: u32,
) -> Result<Vec<PlannedDay>, CalendarError> {
    if start_day == 0 || start_day > cycle_duration_days {
        return Err(CalendarError::integrity(format!(
            "start day {} outside cycle 1..={}",
            start_day, cycle_duration_days
        )));
    }
    if planned.is_empty() {
        return Err(CalendarError::BuilderOutput(
            "builder returned no days".to_string(),
        ));
    }

    let expected = (cycle_duration_days - start_day + 1) as usize;
    planned.truncate(expected);
    planned.resize_with(expected, || PlannedDay {
        day_index: None,
        stage_name: UNKNOWN_STAGE.to_string(),
        tasks: vec![PLACEHOLDER_TASK.to_string()],
        weather_note: None,
    });

    for (offset, day) in (0u32..).zip(planned.iter_mut()) {
        let index = start_day + offset;
        day.day_index = Some(index);
        if index >= OUTLOOK_FROM_DAY && day.weather_note.is_none() {
            day.weather_note = Some(OUTLOOK_NOTE.to_string());
        }
    }

    Ok(planned)
}

/// Attach expected weather from `forecast` to normalized days.
///
/// Days without an index are skipped; call [`normalize_planned_days`] first.
pub fn attach_weather(
    planned: Vec<PlannedDay>,
    forecast: &[ForecastDay],
    fallback: &ClimateSnapshot,
) -> Vec<CalendarDay> {
    planned
        .into_iter()
        .filter_map(|day| {
            let day_index = day.day_index?;
            Some(CalendarDay {
                day_index,
                stage_name: day.stage_name,
                tasks: day.tasks,
                weather: weather_for_day(forecast, day_index, fallback),
                weather_note: day.weather_note,
            })
        })
        .collect()
}
