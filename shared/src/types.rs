//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GpsCoordinates {
    pub lat: Decimal,
    pub lon: Decimal,
}

impl GpsCoordinates {
    pub fn new(lat: Decimal, lon: Decimal) -> Self {
        Self { lat, lon }
    }
}

/// Indian cropping seasons
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Season {
    Kharif,
    Rabi,
    Summer,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Summer => "Summer",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            "summer" => Ok(Season::Summer),
            _ => Err(format!(
                "Invalid season '{}'. Must be one of: Kharif, Rabi, Summer",
                s
            )),
        }
    }
}

impl TryFrom<String> for Season {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.as_str().to_string()
    }
}
