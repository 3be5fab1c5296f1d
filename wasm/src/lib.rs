//! WebAssembly module for the Crop Calendar platform
//!
//! Lets the farmer dashboard run the regeneration policy and the calendar
//! contiguity check locally, e.g. to show whether a refresh would rebuild the
//! calendar before asking the server to do it.

use shared::{
    check_contiguity, decide, Calendar, DiseaseSignal, FarmContext, RegenerationThresholds,
};
use wasm_bindgen::prelude::*;

/// Decide what a regeneration would do.
///
/// `calendar_json` and `thresholds_json` may be empty for "no calendar" and
/// the default thresholds. Returns the decision as JSON, e.g.
/// `{"outcome":"remake_from","day":5}`.
#[wasm_bindgen]
pub fn decide_regeneration(
    context_json: &str,
    calendar_json: &str,
    disease_analysis: Option<String>,
    thresholds_json: &str,
) -> Result<String, JsValue> {
    decide_json(context_json, calendar_json, disease_analysis.as_deref(), thresholds_json)
        .map_err(|e| JsValue::from_str(&e))
}

/// True if the calendar's days are contiguous and start at day 1 or later
#[wasm_bindgen]
pub fn is_calendar_contiguous(calendar_json: &str) -> bool {
    calendar_contiguous(calendar_json).unwrap_or(false)
}

fn decide_json(
    context_json: &str,
    calendar_json: &str,
    disease_analysis: Option<&str>,
    thresholds_json: &str,
) -> Result<String, String> {
    let context: FarmContext = serde_json::from_str(context_json)
        .map_err(|e| format!("Invalid farm context JSON: {}", e))?;

    let calendar: Option<Calendar> = if calendar_json.trim().is_empty() {
        None
    } else {
        Some(
            serde_json::from_str(calendar_json)
                .map_err(|e| format!("Invalid calendar JSON: {}", e))?,
        )
    };

    let thresholds: RegenerationThresholds = if thresholds_json.trim().is_empty() {
        RegenerationThresholds::default()
    } else {
        serde_json::from_str(thresholds_json)
            .map_err(|e| format!("Invalid thresholds JSON: {}", e))?
    };
    shared::validate_thresholds(&thresholds)?;

    let disease = DiseaseSignal::from_optional(disease_analysis);
    let decision = decide(&context, calendar.as_ref(), disease.as_ref(), &thresholds)
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&decision).map_err(|e| e.to_string())
}

fn calendar_contiguous(calendar_json: &str) -> Result<bool, String> {
    let calendar: Calendar =
        serde_json::from_str(calendar_json).map_err(|e| format!("Invalid calendar JSON: {}", e))?;
    Ok(check_contiguity(&calendar.days).is_ok())
}
