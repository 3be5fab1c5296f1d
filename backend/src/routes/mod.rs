//! Route definitions for the Crop Calendar service

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/farmers/:farmer_id", farmer_routes())
        .route("/crop-profiles", put(handlers::put_crop_profile))
        .route("/crop-profiles/:key", get(handlers::get_crop_profile))
}

/// Per-farmer context and calendar routes
fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/context",
            get(handlers::get_context).put(handlers::put_context),
        )
        .route("/context/day", patch(handlers::update_day))
        .route("/calendar", get(handlers::get_calendar))
        .route("/calendar/today", get(handlers::get_today))
        .route("/calendar/decision", get(handlers::get_decision))
        .route("/calendar/generate", post(handlers::generate_calendar))
}
