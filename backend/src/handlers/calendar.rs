//! Calendar HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::services::CalendarService;
use crate::AppState;

/// Input for a generate request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateCalendarInput {
    /// Field or leaf analysis; any non-blank text forces a full rebuild
    #[validate(length(max = 8000, message = "Disease analysis is too long"))]
    pub disease_analysis: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionQuery {
    pub disease_analysis: Option<String>,
}

/// Get the farmer's stored calendar
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CalendarService::new(&state);

    match service.get(farmer_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Tasks for the farmer's current day
pub async fn get_today(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CalendarService::new(&state);

    match service.today(farmer_id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Report what a generate request would do
pub async fn get_decision(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
    Query(query): Query<DecisionQuery>,
) -> impl IntoResponse {
    let service = CalendarService::new(&state);

    match service
        .preview(farmer_id, query.disease_analysis.as_deref())
        .await
    {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Generate, remake or keep the farmer's calendar
pub async fn generate_calendar(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
    Json(input): Json<GenerateCalendarInput>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }

    let _guard = match state.regeneration_locks.acquire(farmer_id) {
        Ok(guard) => guard,
        Err(e) => return e.into_response(),
    };

    let service = CalendarService::new(&state);

    match service
        .generate(farmer_id, input.disease_analysis.as_deref())
        .await
    {
        Ok(generation) => {
            let status = if generation.regenerated {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(generation)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
