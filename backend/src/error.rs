//! Error handling for the Crop Calendar service
//!
//! Every error is rendered as `{"error": {"code", "message", "field"?}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::CalendarError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Calendar errors
    #[error("Calendar regeneration already in progress for farmer {0}")]
    RegenerationInProgress(uuid::Uuid),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    // External service errors
    #[error("Forecast service error: {0}")]
    ForecastService(String),

    #[error("Calendar agent error: {0}")]
    CalendarAgent(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
            field: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::RegenerationInProgress(_) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "REGENERATION_IN_PROGRESS",
                    "A calendar regeneration is already running for this farmer".to_string(),
                ),
            ),
            AppError::Calendar(CalendarError::InvalidContext { field }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_CONTEXT".to_string(),
                    message: format!("Farm context is missing a valid {}", field),
                    field: Some(field.to_string()),
                },
            ),
            AppError::Calendar(CalendarError::IntegrityViolation { reason }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CALENDAR_INTEGRITY",
                    format!("Calendar update rejected: {}", reason),
                ),
            ),
            AppError::Calendar(CalendarError::BuilderOutput(msg)) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "CALENDAR_AGENT_ERROR",
                    format!("Calendar agent returned unusable output: {}", msg),
                ),
            ),
            AppError::ForecastService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("FORECAST_SERVICE_ERROR", format!("Forecast service error: {}", msg)),
            ),
            AppError::CalendarAgent(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("CALENDAR_AGENT_ERROR", format!("Calendar agent error: {}", msg)),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred".to_string()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_context_maps_to_unprocessable() {
        let err = AppError::from(CalendarError::InvalidContext {
            field: "day_of_cycle",
        });
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail.code, "INVALID_CONTEXT");
        assert_eq!(detail.field.as_deref(), Some("day_of_cycle"));
    }

    #[test]
    fn test_regeneration_in_progress_is_conflict() {
        let err = AppError::RegenerationInProgress(uuid::Uuid::nil());
        assert_eq!(err.status_and_detail().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_integrity_violation_is_server_error() {
        let err = AppError::from(CalendarError::integrity("day 7 follows day 5"));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(detail.message.contains("day 7 follows day 5"));
    }

    #[test]
    fn test_internal_error_is_server_error() {
        let (status, detail) = AppError::Internal("Day 0 out of range".to_string()).status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_found_message() {
        let (status, detail) = AppError::NotFound("Farm context".to_string()).status_and_detail();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(detail.message, "Farm context not found");
    }
}
