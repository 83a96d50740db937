use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::features::geo::services::{convert_from_latlon, CoordinateFormat};
use crate::features::reports::dtos::{AttachmentDto, ReportDisplayDto, VersionTimestampDto};
use crate::features::reports::models::{AttachedFile, SpillReport};
use crate::shared::constants::{
    is_image_extension, CCG_DISPLAY_FMT, DISPLAY_DATE_FMT, FILESAFE_TIMESTAMP, HTML_TIMESTAMP,
};
use crate::shared::lookups::timezone_label;

pub const UNKNOWN_USER: &str = "Unknown User";

/// Author's staff name, else the stored name (legacy rows), else "Unknown User"
pub fn resolve_recorded_by(staff_name: Option<String>, recorded_by: Option<String>) -> String {
    staff_name
        .filter(|s| !s.trim().is_empty())
        .or(recorded_by.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

pub fn version_key(ts: &DateTime<Utc>) -> String {
    ts.format(FILESAFE_TIMESTAMP).to_string()
}

pub fn version_timestamp(ts: DateTime<Utc>) -> VersionTimestampDto {
    VersionTimestampDto {
        ts,
        ts_url: version_key(&ts),
        ts_display: ts.format(DISPLAY_DATE_FMT).to_string(),
        ts_ccg_format: ts.format(CCG_DISPLAY_FMT).to_string(),
    }
}

pub fn attachment_dto(file: AttachedFile) -> AttachmentDto {
    let url_path = format!(
        "/api/reports/{}/attachments/{}",
        file.report_num, file.filename
    );
    let icon_path = if is_image_extension(&file.file_type) {
        url_path.clone()
    } else {
        format!("icons/{}.png", file.file_type)
    };
    AttachmentDto {
        file,
        url_path,
        icon_path,
    }
}

/// (`*_html`, `*_ccg`, `*_tz_ccg`) for a report or spill date
fn date_views(
    date: Option<NaiveDateTime>,
    timezone: Option<&str>,
) -> (Option<String>, Option<String>, Option<String>) {
    match date {
        Some(d) => (
            Some(d.format(HTML_TIMESTAMP).to_string()),
            Some(d.format(CCG_DISPLAY_FMT).to_string()),
            timezone.and_then(timezone_label).map(str::to_string),
        ),
        None => (None, None, None),
    }
}

pub fn build_display(
    mut report: SpillReport,
    diff: BTreeMap<String, String>,
    attachments: Vec<AttachmentDto>,
) -> ReportDisplayDto {
    let format = report
        .fields
        .coordinate_type
        .as_deref()
        .and_then(|s| s.parse::<CoordinateFormat>().ok())
        .unwrap_or_default();
    if report.fields.coordinate_type.is_none() {
        report.fields.coordinate_type = Some(format.as_str().to_string());
    }

    let coordinate_formats = match (report.fields.latitude, report.fields.longitude) {
        (Some(lat), Some(lon)) => Some(convert_from_latlon(lat, lon)),
        _ => None,
    };

    let (report_date_html, report_date_ccg, report_tz_ccg) = date_views(
        report.fields.report_date,
        report.fields.report_timezone.as_deref(),
    );
    let (spill_date_html, spill_date_ccg, spill_tz_ccg) = date_views(
        report.fields.spill_date,
        report.fields.spill_timezone.as_deref(),
    );

    ReportDisplayDto {
        last_updated_ts: version_key(&report.last_updated),
        last_updated_ccg: report.last_updated.format(CCG_DISPLAY_FMT).to_string(),
        report_date_html,
        report_date_ccg,
        report_tz_ccg,
        spill_date_html,
        spill_date_ccg,
        spill_tz_ccg,
        coord_pattern: format.pattern().to_string(),
        coord_placeholder: format.placeholder().to_string(),
        coord_help: format.help(),
        coordinate_formats,
        diff,
        attachments,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ReportFields;
    use chrono::NaiveDate;

    #[test]
    fn test_resolve_recorded_by() {
        assert_eq!(
            resolve_recorded_by(Some("Jane Diver".into()), Some("legacy".into())),
            "Jane Diver"
        );
        assert_eq!(resolve_recorded_by(None, Some("legacy".into())), "legacy");
        assert_eq!(resolve_recorded_by(None, Some(" ".into())), UNKNOWN_USER);
        assert_eq!(resolve_recorded_by(None, None), UNKNOWN_USER);
    }

    #[test]
    fn test_attachment_paths() {
        let image = attachment_dto(AttachedFile {
            id: 1,
            report_num: "2021-14".into(),
            filename: "sheen.png".into(),
            file_type: "png".into(),
        });
        assert_eq!(image.url_path, "/api/reports/2021-14/attachments/sheen.png");
        assert_eq!(image.icon_path, image.url_path);

        let doc = attachment_dto(AttachedFile {
            id: 2,
            report_num: "2021-14".into(),
            filename: "log.pdf".into(),
            file_type: "pdf".into(),
        });
        assert_eq!(doc.icon_path, "icons/pdf.png");
    }

    #[test]
    fn test_version_timestamp_formats() {
        let ts = DateTime::parse_from_rfc3339("2021-03-04T13:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        let v = version_timestamp(ts);
        assert_eq!(v.ts_url, "20210304-130509");
        assert_eq!(v.ts_display, "2021-03-04 13:05:09");
        assert_eq!(v.ts_ccg_format, "2021-03-04 1305");
    }

    #[test]
    fn test_build_display() {
        let report = SpillReport {
            id: 3,
            last_updated: DateTime::parse_from_rfc3339("2021-03-04T13:05:09Z")
                .unwrap()
                .with_timezone(&Utc),
            fields: ReportFields {
                report_num: "2021-14".into(),
                report_date: NaiveDate::from_ymd_opt(2021, 3, 4)
                    .and_then(|d| d.and_hms_opt(11, 30, 0)),
                report_timezone: Some("America/Vancouver".into()),
                latitude: Some(49.282778),
                longitude: Some(-123.120556),
                ..Default::default()
            },
        };

        let display = build_display(report, BTreeMap::new(), Vec::new());
        assert_eq!(display.last_updated_ts, "20210304-130509");
        assert_eq!(display.last_updated_ccg, "2021-03-04 1305");
        assert_eq!(display.report_date_html.as_deref(), Some("2021-03-04T11:30"));
        assert_eq!(display.report_date_ccg.as_deref(), Some("2021-03-04 1130"));
        assert_eq!(display.report_tz_ccg.as_deref(), Some("PST"));
        assert!(display.spill_date_html.is_none());
        assert_eq!(
            display.report.fields.coordinate_type.as_deref(),
            Some("Decimal Degrees")
        );
        assert_eq!(display.coord_help, "Format: XX.XXX,-XXX.XXX");
        assert_eq!(
            display
                .coordinate_formats
                .unwrap()
                .degrees_minutes_seconds,
            "49 16 58 N 123 7 14 W"
        );
    }
}
