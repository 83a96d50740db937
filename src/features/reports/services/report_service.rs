use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDateTime, SubsecRound, Utc};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::geo::services::{convert_to_latlon, CoordinateFormat};
use crate::features::reports::dtos::{
    AttachmentDto, ReportDisplayDto, SaveReportDto, VersionTimestampDto,
};
use crate::features::reports::models::{NewAttachment, ReportFields, ReportVersions, SpillReport};
use crate::features::reports::repository::ReportRepository;
use crate::modules::storage::{LocalStorage, StagedFile};
use crate::shared::constants::{FILESAFE_TIMESTAMP, HTML_TIMESTAMP};
use crate::shared::validation::{file_extension, secure_filename, REPORT_NUM_REGEX};

use super::diff::get_diff;
use super::display::{attachment_dto, build_display, resolve_recorded_by, version_timestamp};

/// HTML `datetime-local` sends seconds only when they are non-zero
const HTML_TIMESTAMP_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// A freshly inserted version and how many versions existed before it
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub report: SpillReport,
    pub version_count: i64,
}

/// Service for spill report versions and their attachments
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
    storage: Arc<LocalStorage>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepository>, storage: Arc<LocalStorage>) -> Self {
        Self { repo, storage }
    }

    /// Parse a `%Y%m%d-%H%M%S` version key (UTC)
    pub fn parse_version_timestamp(ts: &str) -> Result<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(ts, FILESAFE_TIMESTAMP)
            .map(|naive| naive.and_utc())
            .map_err(|_| AppError::Validation(format!("Invalid version timestamp: {}", ts)))
    }

    /// Version current at `at` (latest when `None`) and the one before it
    pub async fn get_report(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<ReportVersions> {
        let mut versions = self.repo.latest_versions(report_num, at, 2).await?.into_iter();

        let current = versions
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_num)))?;

        Ok(ReportVersions {
            current,
            previous: versions.next(),
        })
    }

    /// Latest version of every report, most recently updated first
    pub async fn list_all_reports(&self) -> Result<Vec<SpillReport>> {
        let rows = self.repo.all_versions().await?;

        let mut latest: HashMap<String, SpillReport> = HashMap::new();
        for row in rows {
            match latest.get(&row.fields.report_num) {
                Some(best) if (best.last_updated, best.id) >= (row.last_updated, row.id) => {}
                _ => {
                    latest.insert(row.fields.report_num.clone(), row);
                }
            }
        }

        let mut reports: Vec<SpillReport> = latest.into_values().collect();
        reports.sort_by(|a, b| (b.last_updated, b.id).cmp(&(a.last_updated, a.id)));
        Ok(reports)
    }

    /// Every stored version, oldest row first
    pub async fn all_versions(&self) -> Result<Vec<SpillReport>> {
        self.repo.all_versions().await
    }

    /// Validate the form, insert a new version and attach staged files
    pub async fn save_report_data(
        &self,
        dto: SaveReportDto,
        user: &AuthenticatedUser,
    ) -> Result<SavedReport> {
        let (report_num, mut fields, attachments) = normalize_form(dto)?;

        fields.recorded_by = Some(user.display_name().to_string());
        fields.user_id = user.id;
        let last_updated = Utc::now().trunc_subsecs(0);

        let version_count = match report_num {
            Some(num) => {
                // New numbers only come from the sequence
                let count = self.repo.count_versions(&num).await?;
                if count == 0 {
                    return Err(AppError::NotFound(format!("Report {} not found", num)));
                }
                fields.report_num = num;
                count
            }
            None => {
                let seq = self.repo.next_report_sequence().await?;
                fields.report_num = format!("{}-{}", last_updated.year(), seq);
                0
            }
        };

        let report = self.repo.insert_version(last_updated, &fields).await?;

        tracing::info!(
            "Saved report {} version {} by user {}",
            report.fields.report_num,
            version_count + 1,
            user.id
        );

        if let Err(e) = self.repo.refresh_report_map(&report.fields.report_num).await {
            tracing::error!(
                "Failed to refresh map for report {}: {:?}",
                report.fields.report_num,
                e
            );
        }

        self.attach_staged_files(&report.fields.report_num, &attachments)
            .await;

        Ok(SavedReport {
            report,
            version_count,
        })
    }

    /// Record staged uploads against a report and move them into its folder
    async fn attach_staged_files(&self, report_num: &str, filenames: &[String]) {
        let mut attachments: Vec<NewAttachment> = Vec::new();
        for name in filenames {
            let clean = match secure_filename(name) {
                Some(clean) if &clean == name => clean,
                _ => {
                    tracing::warn!("Skipping attachment with unsafe name: {:?}", name);
                    continue;
                }
            };
            if !self.storage.is_staged(&clean).await {
                tracing::warn!(
                    "Skipping attachment {} for report {}: not in staging",
                    clean,
                    report_num
                );
                continue;
            }
            attachments.push(NewAttachment {
                report_num: report_num.to_string(),
                file_type: file_extension(&clean),
                filename: clean,
            });
        }

        if attachments.is_empty() {
            return;
        }

        if let Err(e) = self.repo.insert_attachments(&attachments).await {
            tracing::error!(
                "Failed to record attachments for report {}: {:?}",
                report_num,
                e
            );
            return;
        }

        for attachment in &attachments {
            if let Err(e) = self
                .storage
                .move_to_report(report_num, &attachment.filename)
                .await
            {
                tracing::error!(
                    "Failed to move attachment {} for report {}: {}",
                    attachment.filename,
                    report_num,
                    e
                );
            }
        }
    }

    pub async fn report_for_display(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<ReportDisplayDto> {
        let ReportVersions {
            mut current,
            previous,
        } = self.get_report(report_num, at).await?;

        let diff = get_diff(&current, previous.as_ref());

        let staff_name = self.repo.find_staff_name(current.fields.user_id).await?;
        current.fields.recorded_by = Some(resolve_recorded_by(
            staff_name,
            current.fields.recorded_by.take(),
        ));

        let attachments = self.get_attachments(report_num).await?;
        Ok(build_display(current, diff, attachments))
    }

    pub async fn get_timestamps(&self, report_num: &str) -> Result<Vec<VersionTimestampDto>> {
        let timestamps = self.repo.version_timestamps(report_num).await?;
        if timestamps.is_empty() {
            return Err(AppError::NotFound(format!(
                "Report {} not found",
                report_num
            )));
        }
        Ok(timestamps.into_iter().map(version_timestamp).collect())
    }

    pub async fn get_attachments(&self, report_num: &str) -> Result<Vec<AttachmentDto>> {
        let files = self.repo.list_attachments(report_num).await?;
        Ok(files.into_iter().map(attachment_dto).collect())
    }

    pub async fn stage_attachment(&self, original_name: &str, data: &[u8]) -> Result<StagedFile> {
        Ok(self.storage.stage(original_name, data).await?)
    }

    pub async fn read_attachment(&self, report_num: &str, filename: &str) -> Result<Vec<u8>> {
        Ok(self.storage.read_report_file(report_num, filename).await?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_html_date(value: Option<String>, label: &str) -> Result<Option<NaiveDateTime>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, HTML_TIMESTAMP)
        .or_else(|_| NaiveDateTime::parse_from_str(value, HTML_TIMESTAMP_SECONDS))
        .map(Some)
        .map_err(|_| AppError::Validation(format!("Invalid {}: {}", label, value)))
}

/// Form payload to row fields: coordinates resolved, dates parsed, blanks nulled
fn normalize_form(dto: SaveReportDto) -> Result<(Option<String>, ReportFields, Vec<String>)> {
    let coordinate_type = non_blank(dto.coordinate_type);
    let coordinates = non_blank(dto.coordinates);

    let (latitude, longitude) = match (&coordinate_type, &coordinates) {
        (Some(kind), Some(text)) => {
            let format: CoordinateFormat = kind.parse()?;
            let point = convert_to_latlon(format, text)?;
            (Some(point.lat), Some(point.lon))
        }
        _ => (None, None),
    };

    let report_date = parse_html_date(dto.report_date, "report date")?;
    let spill_date = parse_html_date(dto.spill_date, "spill date")?;

    let report_num = non_blank(dto.report_num).map(|n| n.trim().to_string());
    if let Some(num) = &report_num {
        if !REPORT_NUM_REGEX.is_match(num) {
            return Err(AppError::Validation(format!(
                "Invalid report number: {}",
                num
            )));
        }
    }

    let fields = ReportFields {
        recorded_by: None,
        user_id: 0,
        report_num: String::new(),
        report_name: non_blank(dto.report_name),
        update_text: non_blank(dto.update_text),
        report_date,
        report_timezone: non_blank(dto.report_timezone),
        spill_date,
        spill_timezone: non_blank(dto.spill_timezone),
        name_reporter: non_blank(dto.name_reporter),
        phone_reporter: non_blank(dto.phone_reporter),
        email_reporter: non_blank(dto.email_reporter),
        coordinate_type,
        coordinates,
        latitude,
        longitude,
        location_description: non_blank(dto.location_description),
        pollutant: non_blank(dto.pollutant),
        pollutant_details: non_blank(dto.pollutant_details),
        quantity: non_blank(dto.quantity),
        quantity_units: non_blank(dto.quantity_units),
        colour_odour: non_blank(dto.colour_odour),
        origin: non_blank(dto.origin),
        weather: non_blank(dto.weather),
        situation_info: non_blank(dto.situation_info),
        response_activated: non_blank(dto.response_activated),
        vessel_name: non_blank(dto.vessel_name),
        call_sign: non_blank(dto.call_sign),
        vessel_length: non_blank(dto.vessel_length),
        vessel_type: non_blank(dto.vessel_type),
        owner_agent: non_blank(dto.owner_agent),
        vessel_additional_info: non_blank(dto.vessel_additional_info),
        ccg_duty_officer: non_blank(dto.ccg_duty_officer),
        tc_marine_safety: non_blank(dto.tc_marine_safety),
        vancouver_hm: non_blank(dto.vancouver_hm),
        area_mcts_centre: non_blank(dto.area_mcts_centre),
        dfo_public_affairs: non_blank(dto.dfo_public_affairs),
        roc_officer: non_blank(dto.roc_officer),
        er_region: non_blank(dto.er_region),
        fleet_tasking: non_blank(dto.fleet_tasking),
        station_or_ship: non_blank(dto.station_or_ship),
        unit: non_blank(dto.unit),
        severity: dto.severity,
    };

    Ok((report_num, fields, dto.attachments))
}
