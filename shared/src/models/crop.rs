//! Crop timeline profiles

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Season;

/// Cycle length used when no profile data is available
pub const DEFAULT_CYCLE_DURATION_DAYS: u32 = 120;

/// Researched timeline for one crop in one state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropProfile {
    pub crop_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub source_domains_used: Vec<String>,
    /// Keyed by season name (Kharif / Rabi / Summer)
    #[serde(default)]
    pub seasons: BTreeMap<String, SeasonProfile>,
}

impl CropProfile {
    pub fn key(&self) -> String {
        crop_profile_key(&self.crop_name, &self.state)
    }

    /// Season entry, matching the key case-insensitively
    pub fn season(&self, season: Season) -> Option<&SeasonProfile> {
        self.seasons
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(season.as_str()))
            .map(|(_, profile)| profile)
    }
}

/// Per-season timeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeasonProfile {
    #[serde(default)]
    pub sowing_months: Vec<String>,
    #[serde(default)]
    pub harvesting_months: Vec<String>,
    #[serde(default)]
    pub cycle_duration_days: u32,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub pesticides: Vec<Pesticide>,
    #[serde(default)]
    pub fertilizers: Vec<Fertilizer>,
}

/// A crop-specific growth stage, positioned as a percentage of the cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub name: String,
    pub start_pct: Decimal,
    pub end_pct: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub typical_months: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pesticide {
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub start_pct: Decimal,
    #[serde(default)]
    pub duration_pct: Decimal,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub target_pests: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fertilizer {
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub start_pct: Decimal,
    #[serde(default)]
    pub duration_pct: Decimal,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub dosage: String,
}

/// Storage key for a crop in a state, e.g. `rice_maharashtra`
pub fn crop_profile_key(crop_name: &str, state: &str) -> String {
    let normalize = |s: &str| s.trim().to_lowercase().replace(' ', "_");
    let crop = normalize(crop_name);
    let state = normalize(state);
    if state.is_empty() {
        crop
    } else {
        format!("{}_{}", crop, state)
    }
}

/// Cycle length for `season`, or `default_days` when the profile has none
pub fn cycle_duration_days(profile: Option<&CropProfile>, season: Season, default_days: u32) -> u32 {
    profile
        .and_then(|p| p.season(season))
        .map(|s| s.cycle_duration_days)
        .filter(|days| *days > 0)
        .unwrap_or(default_days)
}
