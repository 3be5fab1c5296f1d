//! Calendar service
//!
//! Runs the regeneration policy against the stored calendar and, when the
//! policy asks for it, builds and persists a new or merged calendar.
//!
//! A build writes nothing until the merged result passes the contiguity
//! checks. A failed forecast, builder call or merge leaves the stored
//! calendar as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    apply_decision, attach_weather, cycle_duration_days, decide, normalize_planned_days, Calendar,
    ClimateSnapshot, DiseaseSignal, FarmContext, ForecastDay, PlannedDay, RegenerationDecision,
    RegenerationThresholds, TodayPlan,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{BuildCalendarRequest, CalendarBuilder, ForecastClient, ForecastSource};
use crate::services::{CropProfileService, FarmContextService, RegenerationLocks};
use crate::AppState;

#[derive(Clone)]
pub struct CalendarService {
    db: PgPool,
    builder: Arc<dyn CalendarBuilder>,
    forecast: ForecastClient,
    locks: RegenerationLocks,
    thresholds: RegenerationThresholds,
    default_cycle_duration_days: u32,
}

/// Stored calendar with its bookkeeping columns
#[derive(Debug, Clone, Serialize)]
pub struct CalendarRecord {
    pub farmer_id: Uuid,
    pub calendar: Calendar,
    /// When the current calendar was last fully generated
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CalendarRow {
    farmer_id: Uuid,
    calendar: Json<Calendar>,
    generated_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CalendarRow> for CalendarRecord {
    fn from(row: CalendarRow) -> Self {
        Self {
            farmer_id: row.farmer_id,
            calendar: row.calendar.0,
            generated_at: row.generated_at,
            updated_at: row.updated_at,
        }
    }
}

/// Result of a generate request
#[derive(Debug, Clone, Serialize)]
pub struct CalendarGeneration {
    pub decision: RegenerationDecision,
    /// False when the policy kept the stored calendar
    pub regenerated: bool,
    pub calendar: Calendar,
}

/// What a generate request would do, without building anything
#[derive(Debug, Clone, Serialize)]
pub struct DecisionPreview {
    pub decision: RegenerationDecision,
    pub day_of_cycle: u32,
    pub cycle_duration_days: u32,
    pub has_calendar: bool,
    pub regeneration_in_progress: bool,
}

/// Everything loaded before the policy runs
struct PlanningInputs {
    context: FarmContext,
    profile: Option<shared::CropProfile>,
    cycle_duration_days: u32,
    existing: Option<Calendar>,
}

impl CalendarService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            builder: state.calendar_agent.clone(),
            forecast: state.forecast.clone(),
            locks: state.regeneration_locks.clone(),
            thresholds: state.config.calendar.thresholds(),
            default_cycle_duration_days: state.config.calendar.default_cycle_duration_days,
        }
    }

    pub async fn find(&self, farmer_id: Uuid) -> AppResult<Option<CalendarRecord>> {
        let row = sqlx::query_as::<_, CalendarRow>(
            r#"
            SELECT farmer_id, calendar, generated_at, updated_at
            FROM calendars
            WHERE farmer_id = $1
            "#,
        )
        .bind(farmer_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(CalendarRecord::from))
    }

    pub async fn get(&self, farmer_id: Uuid) -> AppResult<CalendarRecord> {
        self.find(farmer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Calendar".to_string()))
    }

    /// Tasks for the farmer's current day of cycle
    pub async fn today(&self, farmer_id: Uuid) -> AppResult<TodayPlan> {
        let context = FarmContextService::new(self.db.clone())
            .get(farmer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farm context".to_string()))?;
        let day = context.current_day()?;
        let record = self.get(farmer_id).await?;

        Ok(record.calendar.today(day))
    }

    /// Run the policy without building or writing
    pub async fn preview(
        &self,
        farmer_id: Uuid,
        disease_analysis: Option<&str>,
    ) -> AppResult<DecisionPreview> {
        let inputs = self.load_inputs(farmer_id).await?;
        let disease = DiseaseSignal::from_optional(disease_analysis);
        let decision = decide(
            &inputs.context,
            inputs.existing.as_ref(),
            disease.as_ref(),
            &self.thresholds,
        )?;

        Ok(DecisionPreview {
            decision,
            day_of_cycle: inputs.context.current_day()?,
            cycle_duration_days: inputs.cycle_duration_days,
            has_calendar: inputs.existing.is_some(),
            regeneration_in_progress: self.locks.is_held(farmer_id),
        })
    }

    /// Decide on, build and persist the farmer's calendar.
    ///
    /// The caller must hold the farmer's regeneration lock.
    pub async fn generate(
        &self,
        farmer_id: Uuid,
        disease_analysis: Option<&str>,
    ) -> AppResult<CalendarGeneration> {
        let inputs = self.load_inputs(farmer_id).await?;
        let generation = run_generation(
            farmer_id,
            inputs,
            disease_analysis,
            &self.thresholds,
            &self.forecast,
            self.builder.as_ref(),
        )
        .await?;

        if generation.regenerated {
            let full = generation.decision == RegenerationDecision::FullRegenerate;
            self.save(farmer_id, &generation.calendar, full).await?;

            tracing::info!(
                %farmer_id,
                decision = %generation.decision,
                days = generation.calendar.days.len(),
                "Calendar saved"
            );
        }

        Ok(generation)
    }

    async fn load_inputs(&self, farmer_id: Uuid) -> AppResult<PlanningInputs> {
        let context = FarmContextService::new(self.db.clone())
            .get(farmer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farm context".to_string()))?;

        let key = context.crop_profile_key();
        let profile = CropProfileService::new(self.db.clone()).find(&key).await?;
        if profile.is_none() {
            tracing::warn!(
                %farmer_id,
                %key,
                default_days = self.default_cycle_duration_days,
                "No crop profile found, using default cycle length"
            );
        }

        let cycle_duration_days = cycle_duration_days(
            profile.as_ref(),
            context.crop.season,
            self.default_cycle_duration_days,
        );

        if let Some(day) = context.day_of_cycle {
            if day > cycle_duration_days {
                return Err(AppError::Validation {
                    field: "day_of_cycle".to_string(),
                    message: format!(
                        "Day {} is beyond the {}-day crop cycle",
                        day, cycle_duration_days
                    ),
                });
            }
        }

        let existing = self.find(farmer_id).await?.map(|r| r.calendar);

        Ok(PlanningInputs {
            context,
            profile,
            cycle_duration_days,
            existing,
        })
    }

    /// Single upsert, so a failed write leaves the prior row in place
    async fn save(&self, farmer_id: Uuid, calendar: &Calendar, full: bool) -> AppResult<()> {
        let start_day = to_column(calendar.start_day)?;
        let end_day = to_column(calendar.end_day().unwrap_or(calendar.start_day))?;

        sqlx::query(
            r#"
            INSERT INTO calendars (farmer_id, calendar, start_day, end_day)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (farmer_id)
            DO UPDATE SET calendar = EXCLUDED.calendar,
                          start_day = EXCLUDED.start_day,
                          end_day = EXCLUDED.end_day,
                          generated_at = CASE WHEN $5 THEN NOW() ELSE calendars.generated_at END,
                          updated_at = NOW()
            "#,
        )
        .bind(farmer_id)
        .bind(Json(calendar))
        .bind(start_day)
        .bind(end_day)
        .bind(full)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// Run the policy and, when it asks for one, the build.
///
/// Writes nothing. A no-op hands back the stored calendar without touching
/// the forecast or the builder.
async fn run_generation(
    farmer_id: Uuid,
    inputs: PlanningInputs,
    disease_analysis: Option<&str>,
    thresholds: &RegenerationThresholds,
    forecast_source: &dyn ForecastSource,
    builder: &dyn CalendarBuilder,
) -> AppResult<CalendarGeneration> {
    let PlanningInputs {
        context,
        profile,
        cycle_duration_days,
        existing,
    } = inputs;

    let disease = DiseaseSignal::from_optional(disease_analysis);
    let decision = decide(&context, existing.as_ref(), disease.as_ref(), thresholds)?;
    tracing::info!(%farmer_id, %decision, "Regeneration decision");

    let Some(start_day) = decision.build_start_day() else {
        let calendar = existing.ok_or_else(|| {
            AppError::Internal("No-op decision without a stored calendar".to_string())
        })?;
        return Ok(CalendarGeneration {
            decision,
            regenerated: false,
            calendar,
        });
    };

    let climate = context.current_climate()?.clone();
    let coordinates = context.location.coordinates.clone().ok_or_else(|| AppError::Validation {
        field: "location.coordinates".to_string(),
        message: "Farm coordinates are required to fetch the forecast".to_string(),
    })?;
    let forecast = forecast_source.daily_forecast(&coordinates).await?;

    let past_days = match (&decision, &existing) {
        (RegenerationDecision::RemakeFrom(day), Some(calendar)) => {
            calendar.days_before(*day).to_vec()
        }
        _ => Vec::new(),
    };

    let request = BuildCalendarRequest {
        context,
        crop_profile: profile,
        forecast: forecast.clone(),
        cycle_duration_days,
        start_day,
        past_days,
        disease_analysis: disease.map(|d| d.as_str().to_string()),
    };
    let planned = builder.build(&request).await?;

    let calendar = assemble_calendar(
        &decision,
        existing.as_ref(),
        planned,
        cycle_duration_days,
        &climate,
        forecast,
    )?
    .ok_or_else(|| AppError::Internal("Build produced no calendar".to_string()))?;

    Ok(CalendarGeneration {
        decision,
        regenerated: true,
        calendar,
    })
}

fn to_column(day: u32) -> AppResult<i32> {
    i32::try_from(day).map_err(|_| AppError::Internal(format!("Day {} out of range", day)))
}

/// Normalize builder output, attach forecast weather and merge per `decision`
pub fn assemble_calendar(
    decision: &RegenerationDecision,
    existing: Option<&Calendar>,
    planned: Vec<PlannedDay>,
    cycle_duration_days: u32,
    climate: &ClimateSnapshot,
    forecast: Vec<ForecastDay>,
) -> AppResult<Option<Calendar>> {
    let Some(start_day) = decision.build_start_day() else {
        return Ok(None);
    };

    let planned = normalize_planned_days(planned, start_day, cycle_duration_days)?;
    let days = attach_weather(planned, &forecast, climate);

    Ok(apply_decision(
        decision,
        existing,
        days,
        cycle_duration_days,
        climate,
        forecast,
    )?)
}
