use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::shared::constants::DISPLAY_DATE_FMT;

/// Everything a user enters on the report form, plus authorship.
///
/// Shared by every version of a report; the version itself is identified by
/// [`SpillReport::last_updated`].
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ReportFields {
    pub recorded_by: Option<String>,
    pub user_id: i32,

    pub report_num: String,
    pub report_name: Option<String>,
    pub update_text: Option<String>,
    pub report_date: Option<NaiveDateTime>,
    pub report_timezone: Option<String>,
    pub spill_date: Option<NaiveDateTime>,
    pub spill_timezone: Option<String>,
    pub name_reporter: Option<String>,
    pub phone_reporter: Option<String>,
    pub email_reporter: Option<String>,

    pub coordinate_type: Option<String>,
    pub coordinates: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_description: Option<String>,
    pub pollutant: Option<String>,
    pub pollutant_details: Option<String>,
    pub quantity: Option<String>,
    pub quantity_units: Option<String>,
    pub colour_odour: Option<String>,
    pub origin: Option<String>,
    pub weather: Option<String>,
    pub situation_info: Option<String>,
    pub response_activated: Option<String>,

    pub vessel_name: Option<String>,
    pub call_sign: Option<String>,
    pub vessel_length: Option<String>,
    pub vessel_type: Option<String>,
    pub owner_agent: Option<String>,
    pub vessel_additional_info: Option<String>,

    pub ccg_duty_officer: Option<String>,
    pub tc_marine_safety: Option<String>,
    pub vancouver_hm: Option<String>,
    pub area_mcts_centre: Option<String>,
    pub dfo_public_affairs: Option<String>,
    pub roc_officer: Option<String>,

    pub er_region: Option<String>,
    pub fleet_tasking: Option<String>,
    pub station_or_ship: Option<String>,
    pub unit: Option<String>,
    pub severity: Option<i32>,
}

/// One immutable version of a spill report
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SpillReport {
    pub id: i32,
    pub last_updated: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: ReportFields,
}

/// The version asked for and the one saved just before it
#[derive(Debug, Clone)]
pub struct ReportVersions {
    pub current: SpillReport,
    pub previous: Option<SpillReport>,
}

fn text(value: &Option<String>) -> Option<String> {
    value.clone()
}

fn date(value: &Option<NaiveDateTime>) -> Option<String> {
    value.map(|d| d.format(DISPLAY_DATE_FMT).to_string())
}

fn number<T: ToString>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

impl ReportFields {
    /// Field name and printable value, in column order
    pub fn field_values(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("recorded_by", text(&self.recorded_by)),
            ("user_id", Some(self.user_id.to_string())),
            ("report_num", Some(self.report_num.clone())),
            ("report_name", text(&self.report_name)),
            ("update_text", text(&self.update_text)),
            ("report_date", date(&self.report_date)),
            ("report_timezone", text(&self.report_timezone)),
            ("spill_date", date(&self.spill_date)),
            ("spill_timezone", text(&self.spill_timezone)),
            ("name_reporter", text(&self.name_reporter)),
            ("phone_reporter", text(&self.phone_reporter)),
            ("email_reporter", text(&self.email_reporter)),
            ("coordinate_type", text(&self.coordinate_type)),
            ("coordinates", text(&self.coordinates)),
            ("latitude", number(&self.latitude)),
            ("longitude", number(&self.longitude)),
            ("location_description", text(&self.location_description)),
            ("pollutant", text(&self.pollutant)),
            ("pollutant_details", text(&self.pollutant_details)),
            ("quantity", text(&self.quantity)),
            ("quantity_units", text(&self.quantity_units)),
            ("colour_odour", text(&self.colour_odour)),
            ("origin", text(&self.origin)),
            ("weather", text(&self.weather)),
            ("situation_info", text(&self.situation_info)),
            ("response_activated", text(&self.response_activated)),
            ("vessel_name", text(&self.vessel_name)),
            ("call_sign", text(&self.call_sign)),
            ("vessel_length", text(&self.vessel_length)),
            ("vessel_type", text(&self.vessel_type)),
            ("owner_agent", text(&self.owner_agent)),
            ("vessel_additional_info", text(&self.vessel_additional_info)),
            ("ccg_duty_officer", text(&self.ccg_duty_officer)),
            ("tc_marine_safety", text(&self.tc_marine_safety)),
            ("vancouver_hm", text(&self.vancouver_hm)),
            ("area_mcts_centre", text(&self.area_mcts_centre)),
            ("dfo_public_affairs", text(&self.dfo_public_affairs)),
            ("roc_officer", text(&self.roc_officer)),
            ("er_region", text(&self.er_region)),
            ("fleet_tasking", text(&self.fleet_tasking)),
            ("station_or_ship", text(&self.station_or_ship)),
            ("unit", text(&self.unit)),
            ("severity", number(&self.severity)),
        ]
    }
}

impl SpillReport {
    /// Bookkeeping columns followed by [`ReportFields::field_values`]
    pub fn row_values(&self) -> Vec<(&'static str, Option<String>)> {
        let mut values = vec![
            ("id", Some(self.id.to_string())),
            (
                "last_updated",
                Some(self.last_updated.format(DISPLAY_DATE_FMT).to_string()),
            ),
        ];
        values.extend(self.fields.field_values());
        values
    }

    /// Names matching [`SpillReport::row_values`]
    pub fn column_names() -> Vec<&'static str> {
        let mut names = vec!["id", "last_updated"];
        names.extend(
            ReportFields::default()
                .field_values()
                .into_iter()
                .map(|(name, _)| name),
        );
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_field_values_format_dates_and_numbers() {
        let fields = ReportFields {
            report_num: "2021-14".to_string(),
            report_date: NaiveDate::from_ymd_opt(2021, 3, 4)
                .and_then(|d| d.and_hms_opt(13, 5, 0)),
            latitude: Some(49.5),
            severity: Some(3),
            ..Default::default()
        };

        let values = fields.field_values();
        let get = |name: &str| {
            values
                .iter()
                .find(|(n, _)| *n == name)
                .and_then(|(_, v)| v.clone())
        };

        assert_eq!(get("report_num").as_deref(), Some("2021-14"));
        assert_eq!(get("report_date").as_deref(), Some("2021-03-04 13:05:00"));
        assert_eq!(get("latitude").as_deref(), Some("49.5"));
        assert_eq!(get("severity").as_deref(), Some("3"));
        assert_eq!(get("pollutant"), None);
    }

    #[test]
    fn test_row_values_start_with_bookkeeping() {
        let report = SpillReport {
            id: 9,
            last_updated: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            fields: ReportFields::default(),
        };
        let names: Vec<&str> = report.row_values().iter().map(|(n, _)| *n).collect();
        assert_eq!(&names[..3], &["id", "last_updated", "recorded_by"]);
        assert_eq!(names.len(), 45);
        assert_eq!(names, SpillReport::column_names());
    }
}
