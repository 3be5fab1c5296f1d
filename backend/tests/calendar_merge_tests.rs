//! Calendar merge and normalization tests
//!
//! Covers:
//! - Remake keeps every day before the remake day untouched
//! - Merged calendars stay contiguous from day 1 to the end of the cycle
//! - Builder output of any length is normalized to the requested span
//! - A remake settles the drift that triggered it

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    apply_decision, attach_weather, check_contiguity, decide, merge_remake,
    normalize_planned_days, Calendar, CalendarDay, CalendarError, ClimateSnapshot, CropSelection,
    FarmContext, ForecastDay, Location, PlannedDay, RegenerationDecision, RegenerationThresholds,
    Season, SoilSnapshot, OUTLOOK_NOTE, PLACEHOLDER_TASK, UNKNOWN_STAGE,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn base_climate() -> ClimateSnapshot {
    ClimateSnapshot::new(dec("30"), dec("60"), dec("5"))
}

fn prior_calendar(n: u32) -> Calendar {
    Calendar {
        start_day: 1,
        cycle_duration_days: n,
        weather_baseline: base_climate(),
        days: (1..=n)
            .map(|i| CalendarDay {
                day_index: i,
                stage_name: format!("Stage {}", i / 10),
                tasks: vec![format!("Original task {}", i)],
                weather: ClimateSnapshot::new(Decimal::from(25 + (i % 7)), dec("60"), dec("5")),
                weather_note: None,
            })
            .collect(),
        forecast_snapshot: Vec::new(),
    }
}

fn rebuilt_days(from: u32, to: u32) -> Vec<CalendarDay> {
    (from..=to)
        .map(|i| CalendarDay {
            day_index: i,
            stage_name: "Remade".to_string(),
            tasks: vec![format!("New task {}", i)],
            weather: ClimateSnapshot::new(dec("38"), dec("62"), dec("6")),
            weather_note: None,
        })
        .collect()
}

fn planned(n: usize) -> Vec<PlannedDay> {
    (0..n)
        .map(|i| PlannedDay {
            day_index: Some(i as u32 * 3),
            stage_name: "Tillering".to_string(),
            tasks: vec![format!("task {}", i)],
            weather_note: None,
        })
        .collect()
}

fn context(day: u32, climate: ClimateSnapshot) -> FarmContext {
    FarmContext {
        location: Location {
            state: "West Bengal".to_string(),
            city: "Bardhaman".to_string(),
            coordinates: None,
        },
        crop: CropSelection {
            name: "Rice".to_string(),
            season: Season::Kharif,
        },
        day_of_cycle: Some(day),
        soil: SoilSnapshot::default(),
        climate: Some(climate),
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Cycle length and a remake day inside it
fn cycle_and_remake_day() -> impl Strategy<Value = (u32, u32)> {
    (1..=150u32).prop_flat_map(|n| (Just(n), 1..=n))
}

/// Cycle length, build start day and builder output length
fn normalization_inputs() -> impl Strategy<Value = (u32, u32, usize)> {
    (1..=150u32).prop_flat_map(|n| (Just(n), 1..=n, 1..=200usize))
}

fn forecast_strategy() -> impl Strategy<Value = Vec<ForecastDay>> {
    prop::collection::vec(
        (
            prop::option::of((-50..=500i64).prop_map(|n| Decimal::new(n, 1))),
            prop::option::of((0..=100i64).prop_map(Decimal::from)),
            prop::option::of((0..=3000i64).prop_map(|n| Decimal::new(n, 1))),
        )
            .prop_map(|(t, h, r)| ForecastDay {
                temperature_c: t,
                humidity_percent: h,
                rainfall_mm: r,
            }),
        0..=16,
    )
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Merge at day k keeps days before k identical and indexes every day by position
    #[test]
    fn test_merge_preserves_past_and_contiguity((n, k) in cycle_and_remake_day()) {
        let prior = prior_calendar(n);
        let merged = merge_remake(&prior, k, rebuilt_days(k, n), n, &base_climate(), Vec::new()).unwrap();

        prop_assert_eq!(merged.days.len(), n as usize);
        for (i, day) in merged.days.iter().enumerate() {
            prop_assert_eq!(day.day_index, i as u32 + 1);
        }
        prop_assert_eq!(&merged.days[..(k - 1) as usize], &prior.days[..(k - 1) as usize]);
        prop_assert!(merged.days[(k - 1) as usize..].iter().all(|d| d.stage_name == "Remade"));
        prop_assert_eq!(merged.start_day, prior.start_day);
        prop_assert!(check_contiguity(&merged.days).is_ok());
    }

    /// Tails that do not start exactly at the remake day are rejected
    #[test]
    fn test_misaligned_tail_is_rejected((n, k) in cycle_and_remake_day(), shift in 1..=5u32) {
        prop_assume!(k + shift <= n);
        let prior = prior_calendar(n);
        let result = merge_remake(&prior, k, rebuilt_days(k + shift, n), n, &base_climate(), Vec::new());
        let is_integrity_violation = matches!(result, Err(CalendarError::IntegrityViolation { .. }));
        prop_assert!(is_integrity_violation);
    }

    /// Builder output of any length covers exactly [start, cycle] after normalization
    #[test]
    fn test_normalization_covers_requested_span((n, start, len) in normalization_inputs()) {
        let days = normalize_planned_days(planned(len), start, n).unwrap();

        prop_assert_eq!(days.len(), (n - start + 1) as usize);
        for (offset, day) in days.iter().enumerate() {
            let index = start + offset as u32;
            prop_assert_eq!(day.day_index, Some(index));
            if offset >= len {
                prop_assert_eq!(day.stage_name.as_str(), UNKNOWN_STAGE);
                prop_assert_eq!(day.tasks.clone(), vec![PLACEHOLDER_TASK.to_string()]);
            }
            if index >= 47 {
                prop_assert_eq!(day.weather_note.as_deref(), Some(OUTLOOK_NOTE));
            }
        }
    }

    /// Weather comes from the forecast inside its horizon and from the last entry after it
    #[test]
    fn test_attached_weather_follows_forecast(forecast in forecast_strategy(), n in 1..=60u32) {
        let fallback = base_climate();
        let days = attach_weather(normalize_planned_days(planned(n as usize), 1, n).unwrap(), &forecast, &fallback);

        for day in &days {
            let d = day.day_index as usize;
            let expected = if forecast.is_empty() {
                fallback.clone()
            } else if d <= forecast.len() {
                forecast[d - 1].resolve(&fallback)
            } else {
                forecast[forecast.len() - 1].resolve(&fallback)
            };
            prop_assert_eq!(&day.weather, &expected);
        }
    }

    /// After a remake at today's conditions the same conditions no longer trigger one
    #[test]
    fn test_remake_settles_drift((n, k) in cycle_and_remake_day(), temp in 39..=50i64) {
        let prior = prior_calendar(n);
        let current = ClimateSnapshot::new(Decimal::from(temp), dec("60"), dec("5"));
        let ctx = context(k, current.clone());
        let thresholds = RegenerationThresholds::default();

        let decision = decide(&ctx, Some(&prior), None, &thresholds).unwrap();
        prop_assert_eq!(decision, RegenerationDecision::RemakeFrom(k));

        let days = attach_weather(normalize_planned_days(planned(3), k, n).unwrap(), &[], &current);
        let merged = apply_decision(&decision, Some(&prior), days, n, &current, Vec::new())
            .unwrap()
            .unwrap();

        prop_assert_eq!(decide(&ctx, Some(&merged), None, &thresholds), Ok(RegenerationDecision::NoOp));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_full_regenerate_replaces_every_day() {
        let prior = prior_calendar(10);
        let days = attach_weather(
            normalize_planned_days(planned(10), 1, 12).unwrap(),
            &[],
            &base_climate(),
        );
        let calendar = apply_decision(
            &RegenerationDecision::FullRegenerate,
            Some(&prior),
            days,
            12,
            &base_climate(),
            Vec::new(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(calendar.days.len(), 12);
        assert!(calendar.days.iter().all(|d| !d.tasks[0].starts_with("Original")));
        assert_eq!(calendar.end_day(), Some(12));
    }

    #[test]
    fn test_remake_on_first_day_replaces_everything() {
        let prior = prior_calendar(5);
        let merged = merge_remake(&prior, 1, rebuilt_days(1, 5), 5, &base_climate(), Vec::new())
            .unwrap();
        assert!(merged.days.iter().all(|d| d.stage_name == "Remade"));
    }

    #[test]
    fn test_remake_can_extend_cycle() {
        let prior = prior_calendar(10);
        let merged = merge_remake(&prior, 8, rebuilt_days(8, 14), 14, &base_climate(), Vec::new())
            .unwrap();
        assert_eq!(merged.cycle_duration_days, 14);
        assert_eq!(merged.days.len(), 14);
        assert_eq!(merged.days[6], prior.days[6]);
    }

    #[test]
    fn test_failed_merge_leaves_prior_untouched() {
        let prior = prior_calendar(10);
        let snapshot = prior.clone();
        let result = merge_remake(&prior, 4, rebuilt_days(4, 9), 10, &base_climate(), Vec::new());
        assert!(result.is_err());
        assert_eq!(prior, snapshot);
    }

    #[test]
    fn test_calendar_json_round_trip_keeps_forecast_snapshot() {
        let mut calendar = prior_calendar(3);
        calendar.forecast_snapshot = vec![ForecastDay {
            temperature_c: Some(dec("28.8")),
            humidity_percent: None,
            rainfall_mm: Some(dec("0.4")),
        }];
        let json = serde_json::to_string(&calendar).unwrap();
        let back: Calendar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, calendar);
    }
}
