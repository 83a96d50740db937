use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::geo::services::CoordinateStrings;
use crate::features::reports::models::{AttachedFile, SpillReport};

/// Report form payload; a missing `report_num` creates a new report
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveReportDto {
    /// Existing report number when saving an update
    #[schema(example = "2021-14")]
    pub report_num: Option<String>,
    #[validate(length(max = 255, message = "Report name must not exceed 255 characters"))]
    pub report_name: Option<String>,
    pub update_text: Option<String>,
    /// HTML `datetime-local` value
    #[schema(example = "2021-03-04T13:05")]
    pub report_date: Option<String>,
    pub report_timezone: Option<String>,
    #[schema(example = "2021-03-04T11:30")]
    pub spill_date: Option<String>,
    pub spill_timezone: Option<String>,
    pub name_reporter: Option<String>,
    pub phone_reporter: Option<String>,
    pub email_reporter: Option<String>,

    #[schema(example = "Degrees Minutes Seconds")]
    pub coordinate_type: Option<String>,
    #[schema(example = "49 16 58 N 123 7 14 W")]
    pub coordinates: Option<String>,
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
    #[validate(range(min = 1, max = 5, message = "Severity must be between 1 and 5"))]
    pub severity: Option<i32>,

    /// Staged attachment filenames returned by the upload endpoint
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveReportResponseDto {
    pub report_num: String,
    /// Versions that existed before this save
    pub version_count: i64,
    /// Version key for `/api/reports/{num}/versions/{ts}`
    pub last_updated_ts: String,
    pub status: String,
    pub report: SpillReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    #[serde(flatten)]
    pub file: AttachedFile,
    pub url_path: String,
    pub icon_path: String,
}

/// A report version prepared for the report page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportDisplayDto {
    #[serde(flatten)]
    pub report: SpillReport,

    pub last_updated_ts: String,
    pub last_updated_ccg: String,
    pub report_date_html: Option<String>,
    pub report_date_ccg: Option<String>,
    pub report_tz_ccg: Option<String>,
    pub spill_date_html: Option<String>,
    pub spill_date_ccg: Option<String>,
    pub spill_tz_ccg: Option<String>,

    pub coord_pattern: String,
    pub coord_placeholder: String,
    pub coord_help: String,
    /// The stored point in every notation, when it has one
    pub coordinate_formats: Option<CoordinateStrings>,

    /// Changed field name to its previous value
    pub diff: BTreeMap<String, String>,
    pub attachments: Vec<AttachmentDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VersionTimestampDto {
    pub ts: DateTime<Utc>,
    pub ts_url: String,
    pub ts_display: String,
    pub ts_ccg_format: String,
}

/// Upload attachment request DTO for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAttachmentsDto {
    /// One or more files (jpg, jpeg, tif, tiff, png, doc, docx, pdf)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StagedAttachmentDto {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
}
