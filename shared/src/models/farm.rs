//! Farm context models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::models::{crop_profile_key, ClimateSnapshot};
use crate::types::{GpsCoordinates, Season};

/// Where the farm is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub state: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GpsCoordinates>,
}

/// The crop being grown this cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropSelection {
    pub name: String,
    pub season: Season,
}

/// Soil classification and measured properties
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    /// depth (e.g. "0-5cm") -> property (e.g. "clay") -> value
    #[serde(default)]
    pub properties: BTreeMap<String, BTreeMap<String, Option<Decimal>>>,
}

/// The current location, crop, cycle day and climate of one farmer.
///
/// `day_of_cycle` and `climate` are optional on the stored record because the
/// upstream lookups that fill them can fail; the accessors below turn their
/// absence into [`CalendarError::InvalidContext`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmContext {
    pub location: Location,
    pub crop: CropSelection,
    #[serde(default)]
    pub day_of_cycle: Option<u32>,
    #[serde(default)]
    pub soil: SoilSnapshot,
    #[serde(default)]
    pub climate: Option<ClimateSnapshot>,
}

impl FarmContext {
    /// 1-based day of the crop cycle
    pub fn current_day(&self) -> Result<u32, CalendarError> {
        match self.day_of_cycle {
            Some(day) if day >= 1 => Ok(day),
            _ => Err(CalendarError::InvalidContext {
                field: "day_of_cycle",
            }),
        }
    }

    pub fn current_climate(&self) -> Result<&ClimateSnapshot, CalendarError> {
        self.climate
            .as_ref()
            .ok_or(CalendarError::InvalidContext { field: "climate" })
    }

    /// Key of the crop profile this context plans against
    pub fn crop_profile_key(&self) -> String {
        crop_profile_key(&self.crop.name, &self.location.state)
    }
}
