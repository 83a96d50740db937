use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireReportEditor;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::permissions::Action;
use crate::features::notifications::NotificationService;
use crate::features::reports::dtos::{
    ReportDisplayDto, SaveReportDto, SaveReportResponseDto, StagedAttachmentDto,
    UploadAttachmentsDto, VersionTimestampDto,
};
use crate::features::reports::models::SpillReport;
use crate::features::reports::services::{version_key, ReportService};
use crate::shared::constants::MAX_ATTACHMENT_SIZE;
use crate::shared::types::ApiResponse;
use crate::shared::validation::file_extension;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub notification_service: Arc<NotificationService>,
}

/// List the latest version of every report
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Latest version of each report, newest first", body = ApiResponse<Vec<SpillReport>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<SpillReport>>>> {
    let reports = state.report_service.list_all_reports().await?;
    Ok(Json(ApiResponse::list(reports)))
}

/// Save a new report, or a new version of an existing one
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = SaveReportDto,
    responses(
        (status = 201, description = "Report version saved", body = ApiResponse<SaveReportResponseDto>),
        (status = 400, description = "Invalid coordinates, dates or report number"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Report editing access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn save_report(
    RequireReportEditor(user): RequireReportEditor,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<SaveReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<SaveReportResponseDto>>)> {
    dto.validate()?;

    let is_new = dto
        .report_num
        .as_deref()
        .is_none_or(|n| n.trim().is_empty());
    if is_new && !user.can(Action::CreateReports) {
        return Err(AppError::Forbidden(
            "Report creation access required".to_string(),
        ));
    }

    let saved = state.report_service.save_report_data(dto, &user).await?;
    // Sent off the request path; failures are only logged
    let notifier = Arc::clone(&state.notification_service);
    let notified = saved.clone();
    tokio::spawn(async move {
        notifier.notify_report_saved(&notified).await;
    });

    let status = if saved.version_count == 0 {
        format!("Report {} created", saved.report.fields.report_num)
    } else {
        format!(
            "Report {} updated (update #{})",
            saved.report.fields.report_num, saved.version_count
        )
    };

    let response = SaveReportResponseDto {
        report_num: saved.report.fields.report_num.clone(),
        version_count: saved.version_count,
        last_updated_ts: version_key(&saved.report.last_updated),
        status: status.clone(),
        report: saved.report,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), Some(status), None)),
    ))
}

/// Stage attachment files before the report is saved
///
/// Accepts multipart/form-data with one or more `files` parts. The returned
/// filenames go in the `attachments` list of the save request.
#[utoipa::path(
    post,
    path = "/api/reports/attachments",
    request_body(
        content = UploadAttachmentsDto,
        content_type = "multipart/form-data",
        description = "Attachment files",
    ),
    responses(
        (status = 201, description = "Files staged", body = ApiResponse<Vec<StagedAttachmentDto>>),
        (status = 400, description = "Invalid file name or type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Report editing access required"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn upload_attachments(
    RequireReportEditor(_user): RequireReportEditor,
    State(state): State<ReportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<StagedAttachmentDto>>>)> {
    let mut staged = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            debug!("Ignoring non-file field: {:?}", field.name());
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        if data.len() > MAX_ATTACHMENT_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_ATTACHMENT_SIZE,
                MAX_ATTACHMENT_SIZE / 1024 / 1024
            )));
        }

        let file = state.report_service.stage_attachment(&file_name, &data).await?;
        staged.push(StagedAttachmentDto {
            filename: file.filename,
            file_type: file.file_type,
        });
    }

    if staged.is_empty() {
        return Err(AppError::BadRequest("At least one file is required".to_string()));
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(staged), None, None)),
    ))
}

/// Current version of a report, prepared for display
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}",
    params(
        ("report_num" = String, Path, description = "Report number, e.g. 2021-14")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportDisplayDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(report_num): Path<String>,
) -> Result<Json<ApiResponse<ReportDisplayDto>>> {
    let report = state
        .report_service
        .report_for_display(&report_num, None)
        .await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Every saved version of a report, newest first
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}/versions",
    params(
        ("report_num" = String, Path, description = "Report number")
    ),
    responses(
        (status = 200, description = "Version timestamps", body = ApiResponse<Vec<VersionTimestampDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_versions(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(report_num): Path<String>,
) -> Result<Json<ApiResponse<Vec<VersionTimestampDto>>>> {
    let versions = state.report_service.get_timestamps(&report_num).await?;
    Ok(Json(ApiResponse::list(versions)))
}

/// A report as it stood at a version timestamp
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}/versions/{ts}",
    params(
        ("report_num" = String, Path, description = "Report number"),
        ("ts" = String, Path, description = "Version key, %Y%m%d-%H%M%S in UTC")
    ),
    responses(
        (status = 200, description = "Report version found", body = ApiResponse<ReportDisplayDto>),
        (status = 400, description = "Malformed version timestamp"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No version at or before the timestamp")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report_version(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path((report_num, ts)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ReportDisplayDto>>> {
    let at = ReportService::parse_version_timestamp(&ts)?;
    let report = state
        .report_service
        .report_for_display(&report_num, Some(at))
        .await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Download an attachment
#[utoipa::path(
    get,
    path = "/api/reports/{report_num}/attachments/{filename}",
    params(
        ("report_num" = String, Path, description = "Report number"),
        ("filename" = String, Path, description = "Attachment filename")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid filename"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn download_attachment(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path((report_num, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let data = state
        .report_service
        .read_attachment(&report_num, &filename)
        .await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            content_type_for(&file_extension(&filename)).to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, data))
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{NotificationConfig, StorageConfig};
    use crate::features::auth::permissions::Role;
    use crate::features::notifications::{build_mailer, MailingListStore};
    use crate::features::reports::repository::memory_repository::MemoryReportRepository;
    use crate::features::reports::routes::routes;
    use crate::modules::storage::LocalStorage;
    use crate::shared::templates::TemplateEngine;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::Router;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;
    use std::path::PathBuf;

    fn app(root: &PathBuf, roles: Vec<Role>) -> (Router, Arc<MemoryReportRepository>) {
        let repo = Arc::new(MemoryReportRepository::default());
        let storage = Arc::new(LocalStorage::new(&StorageConfig {
            upload_root: root.clone(),
            staging_dir: root.join("attachments"),
        }));
        let report_service = Arc::new(ReportService::new(repo.clone(), storage));

        let notifications = NotificationConfig {
            enabled: false,
            relay_url: None,
            relay_api_key: None,
            sender: "updates@example.org".to_string(),
            sender_name: "Spill Tracker".to_string(),
            mailing_list_file: root.join("mailing_lists.json"),
            default_recipients: vec!["duty@example.org".to_string()],
        };
        let notification_service = Arc::new(NotificationService::new(
            build_mailer(&notifications),
            Arc::new(MailingListStore::new(
                notifications.mailing_list_file.clone(),
            )),
            TemplateEngine::builtin(),
            "https://spills.example.org".to_string(),
            notifications.default_recipients.clone(),
        ));

        let router = routes(report_service, notification_service);
        (with_user(router, test_user(roles)), repo)
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("spilltracker-http-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn test_save_then_view_report() {
        let root = temp_root();
        let (app, repo) = app(&root, vec![Role::User]);
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/reports")
            .json(&json!({
                "report_name": "Diesel sheen",
                "coordinate_type": "Degrees Minutes Seconds",
                "coordinates": "49 16 58 N 123 7 14 W",
                "report_date": "2021-03-04T13:05"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: ApiResponse<SaveReportResponseDto> = response.json();
        let saved = body.data.unwrap();
        assert_eq!(saved.version_count, 0);
        assert_eq!(repo.row_count(&saved.report_num).await, 1);

        let response = server.get(&format!("/api/reports/{}", saved.report_num)).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let data = &body["data"];
        assert_eq!(data["report_name"], "Diesel sheen");
        assert_eq!(data["recorded_by"], "Duty Officer");
        assert_eq!(data["report_date_html"], "2021-03-04T13:05");
        assert_eq!(
            data["coordinate_formats"]["Degrees Minutes Seconds"],
            "49 16 58 N 123 7 14 W"
        );

        let response = server
            .get(&format!("/api/reports/{}/versions", saved.report_num))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<VersionTimestampDto>> = response.json();
        assert_eq!(body.meta.unwrap().total, 1);

        let response = server.get("/api/reports").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["meta"]["total"], 1);

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_bad_coordinates_return_message() {
        let root = temp_root();
        let (app, repo) = app(&root, vec![Role::User]);
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/reports")
            .json(&json!({
                "report_num": "2021-14",
                "coordinate_type": "Decimal Degrees",
                "coordinates": "95.0,0.0"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["message"],
            "Latitude must be between -90, 90 degrees (value: 95)"
        );
        assert_eq!(repo.row_count("2021-14").await, 0);
    }

    #[tokio::test]
    async fn test_update_of_unknown_report_is_not_found() {
        let root = temp_root();
        let (app, repo) = app(&root, vec![Role::User]);
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/reports")
            .json(&json!({"report_num": "2021-14", "report_name": "orphan"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(repo.row_count("2021-14").await, 0);

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_observer_cannot_save() {
        let root = temp_root();
        let (app, _repo) = app(&root, vec![Role::Observer]);
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/reports")
            .json(&json!({"report_name": "x"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server.get("/api/reports").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_malformed_version_timestamp() {
        let root = temp_root();
        let (app, _repo) = app(&root, vec![Role::Observer]);
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/reports/2021-14/versions/yesterday")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/reports/2021-14")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_save_and_download_attachment() {
        let root = temp_root();
        let (app, _repo) = app(&root, vec![Role::User]);
        let server = TestServer::new(app).unwrap();

        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"%PDF-1.4".as_slice())
                .file_name("Incident Log.pdf")
                .mime_type("application/pdf"),
        );
        let response = server.post("/api/reports/attachments").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Vec<StagedAttachmentDto>> = response.json();
        let staged = body.data.unwrap();
        assert_eq!(staged[0].filename, "Incident_Log.pdf");
        assert_eq!(staged[0].file_type, "pdf");

        let response = server
            .post("/api/reports")
            .json(&json!({
                "report_name": "With log",
                "attachments": ["Incident_Log.pdf"]
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<SaveReportResponseDto> = response.json();
        let report_num = body.data.unwrap().report_num;

        let response = server
            .get(&format!(
                "/api/reports/{}/attachments/Incident_Log.pdf",
                report_num
            ))
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/pdf");
        assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4");

        let body: serde_json::Value = server
            .get(&format!("/api/reports/{}", report_num))
            .await
            .json();
        assert_eq!(body["data"]["attachments"][0]["icon_path"], "icons/pdf.png");

        let body: ApiResponse<ReportDisplayDto> = server
            .get(&format!("/api/reports/{}", report_num))
            .await
            .json();
        let display = body.data.unwrap();
        assert_eq!(display.report.fields.report_name.as_deref(), Some("With log"));
        assert_eq!(display.attachments[0].file.filename, "Incident_Log.pdf");
        assert!(display.diff.is_empty());

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_disallowed_upload_type() {
        let root = temp_root();
        let (app, _repo) = app(&root, vec![Role::User]);
        let server = TestServer::new(app).unwrap();

        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"#!/bin/sh".as_slice()).file_name("run.sh"),
        );
        server
            .post("/api/reports/attachments")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
