//! Calendar write rules
//!
//! Every calendar produced here has strictly increasing, contiguous
//! `day_index` values. A write that would break that is rejected with
//! [`CalendarError::IntegrityViolation`] and the caller keeps the prior
//! calendar.

use crate::error::CalendarError;
use crate::models::{Calendar, CalendarDay, ClimateSnapshot, ForecastDay};
use crate::policy::RegenerationDecision;

/// Check that `days` is non-empty, starts at day 1 or later and has no gaps
/// or duplicates
pub fn check_contiguity(days: &[CalendarDay]) -> Result<(), CalendarError> {
    let Some(first) = days.first() else {
        return Err(CalendarError::integrity("calendar has no days"));
    };
    if first.day_index == 0 {
        return Err(CalendarError::integrity("day_index must start at 1 or later"));
    }

    for pair in days.windows(2) {
        let (prev, next) = (pair[0].day_index, pair[1].day_index);
        if prev.checked_add(1) != Some(next) {
            return Err(CalendarError::integrity(format!(
                "day {} follows day {}",
                next, prev
            )));
        }
    }
    Ok(())
}

fn check_span(days: &[CalendarDay], start_day: u32, end_day: u32) -> Result<(), CalendarError> {
    check_contiguity(days)?;
    let first = days.first().map(|d| d.day_index);
    let last = days.last().map(|d| d.day_index);
    if first != Some(start_day) || last != Some(end_day) {
        return Err(CalendarError::integrity(format!(
            "built days cover {:?}..={:?}, expected {}..={}",
            first, last, start_day, end_day
        )));
    }
    Ok(())
}

/// New calendar from a full build covering `[start_day, cycle_duration_days]`
pub fn replace_full(
    start_day: u32,
    cycle_duration_days: u32,
    days: Vec<CalendarDay>,
    climate: &ClimateSnapshot,
    forecast: Vec<ForecastDay>,
) -> Result<Calendar, CalendarError> {
    check_span(&days, start_day, cycle_duration_days)?;

    Ok(Calendar {
        start_day,
        cycle_duration_days,
        weather_baseline: climate.clone(),
        days,
        forecast_snapshot: forecast,
    })
}

/// Keep `existing` days before `day` and append the rebuilt `tail`.
///
/// `tail` must cover `[day, cycle_duration_days]`. The merged calendar keeps
/// the original `start_day` and takes `climate` as its new baseline.
pub fn merge_remake(
    existing: &Calendar,
    day: u32,
    tail: Vec<CalendarDay>,
    cycle_duration_days: u32,
    climate: &ClimateSnapshot,
    forecast: Vec<ForecastDay>,
) -> Result<Calendar, CalendarError> {
    if day < existing.start_day {
        return Err(CalendarError::integrity(format!(
            "remake day {} precedes calendar start {}",
            day, existing.start_day
        )));
    }
    check_span(&tail, day, cycle_duration_days)?;

    let mut days: Vec<CalendarDay> = existing
        .days
        .iter()
        .filter(|d| d.day_index < day)
        .cloned()
        .collect();
    days.extend(tail);

    check_contiguity(&days)?;
    if days[0].day_index != existing.start_day {
        return Err(CalendarError::integrity(format!(
            "merged calendar starts at day {}, expected {}",
            days[0].day_index, existing.start_day
        )));
    }

    Ok(Calendar {
        start_day: existing.start_day,
        cycle_duration_days,
        weather_baseline: climate.clone(),
        days,
        forecast_snapshot: forecast,
    })
}

/// Produce the calendar to persist for `decision`, or `None` for a no-op
pub fn apply_decision(
    decision: &RegenerationDecision,
    existing: Option<&Calendar>,
    built: Vec<CalendarDay>,
    cycle_duration_days: u32,
    climate: &ClimateSnapshot,
    forecast: Vec<ForecastDay>,
) -> Result<Option<Calendar>, CalendarError> {
    match decision {
        RegenerationDecision::NoOp => Ok(None),
        RegenerationDecision::FullRegenerate => {
            replace_full(1, cycle_duration_days, built, climate, forecast).map(Some)
        }
        RegenerationDecision::RemakeFrom(day) => {
            let existing = existing
                .ok_or_else(|| CalendarError::integrity("remake requested without a calendar"))?;
            merge_remake(existing, *day, built, cycle_duration_days, climate, forecast).map(Some)
        }
    }
}
