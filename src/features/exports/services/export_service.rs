use std::sync::Arc;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::SpillReport;
use crate::features::reports::services::{version_key, ReportService};
use crate::shared::constants::FILESAFE_TIMESTAMP;

/// A generated spreadsheet ready to be downloaded
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Spreadsheet downloads of report versions
pub struct ExportService {
    reports: Arc<ReportService>,
}

impl ExportService {
    pub fn new(reports: Arc<ReportService>) -> Self {
        Self { reports }
    }

    /// One version as a field/value sheet, with the author's name resolved
    pub async fn export_report(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<CsvExport> {
        let display = self.reports.report_for_display(report_num, at).await?;
        report_to_csv(&display.report)
    }

    /// Every stored row, one line per version
    pub async fn export_all(&self) -> Result<CsvExport> {
        let rows = self.reports.all_versions().await?;
        tracing::info!("Exporting {} report versions", rows.len());
        dump_all_csv(&rows, Utc::now())
    }
}

fn csv_error(e: impl std::fmt::Display) -> AppError {
    tracing::error!("Failed to write CSV export: {}", e);
    AppError::Internal(format!("Failed to write CSV export: {}", e))
}

pub fn report_to_csv(report: &SpillReport) -> Result<CsvExport> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["Field", "Value"]).map_err(csv_error)?;
    for (name, value) in report.row_values() {
        writer
            .write_record([name, value.as_deref().unwrap_or_default()])
            .map_err(csv_error)?;
    }

    Ok(CsvExport {
        filename: format!(
            "report_{}_v{}.csv",
            report.fields.report_num,
            version_key(&report.last_updated)
        ),
        data: writer.into_inner().map_err(csv_error)?,
    })
}

pub fn dump_all_csv(rows: &[SpillReport], generated_at: DateTime<Utc>) -> Result<CsvExport> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    let header: Vec<&str> = SpillReport::column_names();
    writer.write_record(&header).map_err(csv_error)?;

    for row in rows {
        let values: Vec<String> = row
            .row_values()
            .into_iter()
            .map(|(_, value)| value.unwrap_or_default())
            .collect();
        writer.write_record(&values).map_err(csv_error)?;
    }

    Ok(CsvExport {
        filename: format!("reports_{}.csv", generated_at.format(FILESAFE_TIMESTAMP)),
        data: writer.into_inner().map_err(csv_error)?,
    })
}
