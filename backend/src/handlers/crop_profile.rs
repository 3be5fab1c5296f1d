//! Crop profile HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::CropProfile;

use crate::services::CropProfileService;
use crate::AppState;

pub async fn get_crop_profile(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let service = CropProfileService::new(state.db.clone());

    match service.get(&key).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Store a researched profile under its crop/state key
pub async fn put_crop_profile(
    State(state): State<AppState>,
    Json(profile): Json<CropProfile>,
) -> impl IntoResponse {
    let service = CropProfileService::new(state.db.clone());

    match service.upsert(profile).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}
