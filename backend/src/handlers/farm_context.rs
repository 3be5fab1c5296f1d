//! Farm context HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::FarmContext;
use uuid::Uuid;

use crate::services::farm_context::UpdateDayInput;
use crate::services::FarmContextService;
use crate::AppState;

/// Get the farmer's current context
pub async fn get_context(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FarmContextService::new(state.db.clone());

    match service.get_record(farmer_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create or replace the farmer's context
pub async fn put_context(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
    Json(context): Json<FarmContext>,
) -> impl IntoResponse {
    let service = FarmContextService::new(state.db.clone());

    match service.upsert(farmer_id, context).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Advance the crop cycle day
pub async fn update_day(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
    Json(input): Json<UpdateDayInput>,
) -> impl IntoResponse {
    let service = FarmContextService::new(state.db.clone());

    match service.update_day(farmer_id, input).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}
