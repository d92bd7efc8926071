//! Timeframe label validation
//!
//! A room tracks 1-7 timeframes. Labels are either presets or custom
//! `<integer><unit>` strings, unit in {m,h,D,W,M,Y} (unit letter matched
//! case-insensitively; the label is stored as entered, trimmed).

use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::prelude::Json;

use crate::models::error::ApiError;

/// Hard bound on configured timeframes per room
pub const MAX_TIMEFRAMES: usize = 7;

/// Default set for new rooms, long to short horizon
pub const DEFAULT_TIMEFRAMES: [&str; 5] = ["1D", "4H", "1H", "15M", "5M"];

/// Preset labels offered to room owners
pub const PRESET_TIMEFRAMES: [&str; 17] = [
    "1m", "2m", "3m", "4m", "5m", "10m", "15m", "30m", "1h", "2h", "4h", "8h", "1D", "1W", "1M",
    "3M", "1Y",
];

lazy_static! {
    static ref TIMEFRAME_RE: Regex = Regex::new(r"^[0-9]+[mhDWMY]$").unwrap();
}

/// Validate a single label. Returns the trimmed label.
pub fn validate_label(raw: &str) -> Result<String, ApiError> {
    let label = raw.trim();
    if label.is_empty() {
        return Err(ApiError::Validation("Timeframe is required".to_string()));
    }
    // Unit letter is case-insensitive; check against an uppercased tail
    let normalized = normalize_unit(label);
    if !TIMEFRAME_RE.is_match(&normalized) {
        return Err(ApiError::Validation(format!(
            "Invalid timeframe format '{}'. Use: number + m/h/D/W/M/Y (e.g. 7m, 12h)",
            label
        )));
    }
    Ok(label.to_string())
}

/// Validate a full set as supplied at room creation.
pub fn validate_set(labels: &[String]) -> Result<Vec<String>, ApiError> {
    if labels.is_empty() {
        return Err(ApiError::Validation(
            "At least 1 timeframe required".to_string(),
        ));
    }
    if labels.len() > MAX_TIMEFRAMES {
        return Err(ApiError::Validation(format!(
            "Maximum {} timeframes allowed",
            MAX_TIMEFRAMES
        )));
    }
    let mut validated = Vec::with_capacity(labels.len());
    for raw in labels {
        let label = validate_label(raw)?;
        if validated.contains(&label) {
            return Err(ApiError::Validation(format!(
                "Duplicate timeframe '{}'",
                label
            )));
        }
        validated.push(label);
    }
    Ok(validated)
}

/// Map the unit letter onto the canonical case the pattern expects, leaving
/// the digits untouched. "7m" and "7M" both validate; "7x" does not.
fn normalize_unit(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        if chars.peek().is_none() {
            // Last char is the unit; try both cases against the pattern
            match c.to_ascii_lowercase() {
                'm' | 'h' => out.push(c.to_ascii_lowercase()),
                'd' | 'w' | 'y' => out.push(c.to_ascii_uppercase()),
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode the JSON timeframes column of a room row.
pub fn labels_from_json(json: &Json) -> Vec<String> {
    serde_json::from_value(json.clone()).unwrap_or_default()
}

/// Encode labels for the JSON timeframes column.
pub fn labels_to_json(labels: &[String]) -> Json {
    serde_json::json!(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_all_validate() {
        for preset in PRESET_TIMEFRAMES {
            assert!(validate_label(preset).is_ok(), "preset {} rejected", preset);
        }
    }

    #[test]
    fn test_custom_labels() {
        assert_eq!(validate_label("7m").unwrap(), "7m");
        assert_eq!(validate_label(" 12h ").unwrap(), "12h");
        assert!(validate_label("2D").is_ok());
        assert!(validate_label("7M").is_ok());
    }

    #[test]
    fn test_invalid_unit_rejected() {
        assert!(validate_label("7x").is_err());
        assert!(validate_label("7").is_err());
        assert!(validate_label("m7").is_err());
        assert!(validate_label("").is_err());
        assert!(validate_label("1.5h").is_err());
    }

    #[test]
    fn test_unit_case_insensitive() {
        assert!(validate_label("4h").is_ok());
        assert!(validate_label("4H").is_ok());
        assert!(validate_label("1d").is_ok());
        assert!(validate_label("1D").is_ok());
    }

    #[test]
    fn test_set_bounds() {
        let ok: Vec<String> = DEFAULT_TIMEFRAMES.iter().map(|s| s.to_string()).collect();
        assert_eq!(validate_set(&ok).unwrap().len(), 5);

        let empty: Vec<String> = vec![];
        assert!(validate_set(&empty).is_err());

        let eight: Vec<String> = (1..=8).map(|n| format!("{}h", n)).collect();
        assert!(validate_set(&eight).is_err());
    }

    #[test]
    fn test_set_rejects_duplicates() {
        let dup = vec!["1D".to_string(), "1D".to_string()];
        assert!(validate_set(&dup).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let labels: Vec<String> = DEFAULT_TIMEFRAMES.iter().map(|s| s.to_string()).collect();
        let json = labels_to_json(&labels);
        assert_eq!(labels_from_json(&json), labels);
    }
}
