use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireExporter;
use crate::features::exports::services::{CsvExport, ExportService};
use crate::features::reports::ReportService;

fn csv_response(export: CsvExport) -> impl IntoResponse {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    (headers, export.data)
}

/// Download every stored report version as CSV
#[utoipa::path(
    get,
    path = "/api/reports/export",
    responses(
        (status = 200, description = "CSV of all report versions", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Export access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn export_all_reports(
    RequireExporter(user): RequireExporter,
    State(service): State<Arc<ExportService>>,
) -> Result<impl IntoResponse> {
    let export = service.export_all().await?;
    tracing::info!("User {} exported all reports", user.id);
    Ok(csv_response(export))
}

/// Download the current version of a report as CSV
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}/export",
    params(
        ("report_num" = String, Path, description = "Report number")
    ),
    responses(
        (status = 200, description = "Field/value CSV", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Export access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn export_report(
    RequireExporter(_user): RequireExporter,
    State(service): State<Arc<ExportService>>,
    Path(report_num): Path<String>,
) -> Result<impl IntoResponse> {
    let export = service.export_report(&report_num, None).await?;
    Ok(csv_response(export))
}

/// Download a report version as CSV
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}/export/{ts}",
    params(
        ("report_num" = String, Path, description = "Report number"),
        ("ts" = String, Path, description = "Version key, %Y%m%d-%H%M%S in UTC")
    ),
    responses(
        (status = 200, description = "Field/value CSV", content_type = "text/csv"),
        (status = 400, description = "Malformed version timestamp"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Export access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn export_report_version(
    RequireExporter(_user): RequireExporter,
    State(service): State<Arc<ExportService>>,
    Path((report_num, ts)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let at = ReportService::parse_version_timestamp(&ts)?;
    let export = service.export_report(&report_num, Some(at)).await?;
    Ok(csv_response(export))
}
