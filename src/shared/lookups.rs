//! Allowed values for restricted report form fields.

use serde::Serialize;
use utoipa::ToSchema;

pub const COORD_TYPES: &[&str] = &[
    "Decimal Degrees",
    "Degrees Decimal Minutes",
    "Degrees Minutes Seconds",
];

pub const POLLUTANT_TYPES: &[&str] = &[
    "Unknown",
    "Potential",
    "Gasoline",
    "Diesel",
    "Heavy Oils (Bunker, Crude)",
    "Other (Specify)",
];

pub const QUANTITY_UNITS: &[&str] = &[
    "gallons",
    "litres",
    "barrels",
    "sheen dimensions - feet",
    "sheen dimensions - meters",
    "other",
];

pub const ROC_OFFICERS: &[&str] = &["Officer 1", "Officer 2", "Officer 3"];

/// (display label, IANA timezone)
pub const TIMEZONES: &[(&str, &str)] = &[
    ("PST", "America/Vancouver"),
    ("MST", "America/Edmonton"),
    ("CST (Regina)", "America/Regina"),
    ("CST (Winnipeg)", "America/Winnipeg"),
    ("EST", "America/Toronto"),
    ("AST", "America/Halifax"),
    ("Newfoundland", "America/St_Johns"),
];

pub const SEVERITY_LEVELS: &[i32] = &[1, 2, 3, 4, 5];

/// Short display label for a stored IANA timezone
pub fn timezone_label(timezone: &str) -> Option<&'static str> {
    TIMEZONES
        .iter()
        .find(|(_, tz)| *tz == timezone)
        .map(|(label, _)| *label)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimezoneOption {
    pub label: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LookupsDto {
    pub coord_types: Vec<String>,
    pub poll_types: Vec<String>,
    pub quantity_units: Vec<String>,
    pub roc_officers: Vec<String>,
    pub timezones: Vec<TimezoneOption>,
    pub severity_levels: Vec<i32>,
}

impl LookupsDto {
    pub fn build() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            coord_types: owned(COORD_TYPES),
            poll_types: owned(POLLUTANT_TYPES),
            quantity_units: owned(QUANTITY_UNITS),
            roc_officers: owned(ROC_OFFICERS),
            timezones: TIMEZONES
                .iter()
                .map(|(label, tz)| TimezoneOption {
                    label: label.to_string(),
                    timezone: tz.to_string(),
                })
                .collect(),
            severity_levels: SEVERITY_LEVELS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_label() {
        assert_eq!(timezone_label("America/Vancouver"), Some("PST"));
        assert_eq!(timezone_label("America/St_Johns"), Some("Newfoundland"));
        assert_eq!(timezone_label("Europe/Paris"), None);
    }

    #[test]
    fn test_lookups_build() {
        let lookups = LookupsDto::build();
        assert_eq!(lookups.coord_types.len(), 3);
        assert_eq!(lookups.timezones[0].label, "PST");
        assert_eq!(lookups.severity_levels, vec![1, 2, 3, 4, 5]);
    }
}
