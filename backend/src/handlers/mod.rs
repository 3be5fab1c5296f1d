//! HTTP handlers for the Crop Calendar service

pub mod calendar;
pub mod crop_profile;
pub mod farm_context;
pub mod health;

pub use calendar::{generate_calendar, get_calendar, get_decision, get_today};
pub use crop_profile::{get_crop_profile, put_crop_profile};
pub use farm_context::{get_context, put_context, update_day};
pub use health::health_check;
