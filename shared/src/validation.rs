//! Validation utilities for farm contexts, crop profiles and policy settings

use rust_decimal::Decimal;

use crate::models::{CropProfile, FarmContext, Stage};
use crate::policy::RegenerationThresholds;
use crate::types::GpsCoordinates;

// ============================================================================
// Policy Settings
// ============================================================================

/// Thresholds are absolute drifts and cannot be negative
pub fn validate_thresholds(thresholds: &RegenerationThresholds) -> Result<(), &'static str> {
    if thresholds.temp_threshold_c < Decimal::ZERO {
        return Err("Temperature threshold cannot be negative");
    }
    if thresholds.humidity_threshold_pct < Decimal::ZERO {
        return Err("Humidity threshold cannot be negative");
    }
    if thresholds.rainfall_threshold_mm < Decimal::ZERO {
        return Err("Rainfall threshold cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Farm Context
// ============================================================================

pub fn validate_coordinates(coordinates: &GpsCoordinates) -> Result<(), &'static str> {
    if coordinates.lat < Decimal::from(-90) || coordinates.lat > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if coordinates.lon < Decimal::from(-180) || coordinates.lon > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a farm context before it is stored.
///
/// A missing `day_of_cycle` or climate is allowed here; the policy rejects
/// it when a calendar is requested.
pub fn validate_farm_context(context: &FarmContext) -> Result<(), &'static str> {
    if context.location.state.trim().is_empty() {
        return Err("State is required");
    }
    if context.location.city.trim().is_empty() {
        return Err("City is required");
    }
    if context.crop.name.trim().is_empty() {
        return Err("Crop name is required");
    }
    if context.day_of_cycle == Some(0) {
        return Err("Day of cycle starts at 1");
    }
    if let Some(coordinates) = &context.location.coordinates {
        validate_coordinates(coordinates)?;
    }
    if let Some(climate) = &context.climate {
        if climate.humidity_percent < Decimal::ZERO || climate.humidity_percent > Decimal::from(100)
        {
            return Err("Humidity must be between 0 and 100%");
        }
        if climate.rainfall_mm < Decimal::ZERO {
            return Err("Rainfall cannot be negative");
        }
    }
    Ok(())
}

// ============================================================================
// Crop Profiles
// ============================================================================

/// Stage bounds are percentages of the cycle
pub fn validate_stage(stage: &Stage) -> Result<(), &'static str> {
    let hundred = Decimal::from(100);
    if stage.name.trim().is_empty() {
        return Err("Stage name is required");
    }
    if stage.start_pct < Decimal::ZERO || stage.start_pct > hundred {
        return Err("Stage start must be between 0 and 100%");
    }
    if stage.end_pct < Decimal::ZERO || stage.end_pct > hundred {
        return Err("Stage end must be between 0 and 100%");
    }
    if stage.start_pct > stage.end_pct {
        return Err("Stage cannot end before it starts");
    }
    Ok(())
}

pub fn validate_crop_profile(profile: &CropProfile) -> Result<(), &'static str> {
    if profile.crop_name.trim().is_empty() {
        return Err("Crop name is required");
    }
    for season in profile.seasons.values() {
        for stage in &season.stages {
            validate_stage(stage)?;
        }
    }
    Ok(())
}
