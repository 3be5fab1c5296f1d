//! Domain errors raised by the regeneration policy and the calendar store

use thiserror::Error;

/// Errors produced while deciding on, building or merging a calendar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The farm context lacks a field the policy needs
    #[error("invalid farm context: missing or invalid {field}")]
    InvalidContext { field: &'static str },

    /// A calendar write would break day_index contiguity
    #[error("calendar integrity violation: {reason}")]
    IntegrityViolation { reason: String },

    /// The calendar builder returned something unusable
    #[error("invalid builder output: {0}")]
    BuilderOutput(String),
}

impl CalendarError {
    pub fn integrity(reason: impl Into<String>) -> Self {
        CalendarError::IntegrityViolation {
            reason: reason.into(),
        }
    }
}
