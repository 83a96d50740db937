use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::notifications::NotificationService;
use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
///
/// All routes require the auth middleware to be applied by the caller
pub fn routes(
    report_service: Arc<ReportService>,
    notification_service: Arc<NotificationService>,
) -> Router {
    let state = ReportState {
        report_service,
        notification_service,
    };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::save_report),
        )
        .route("/api/reports/attachments", post(handlers::upload_attachments))
        .route("/api/reports/{report_num}", get(handlers::get_report))
        .route(
            "/api/reports/{report_num}/versions",
            get(handlers::list_versions),
        )
        .route(
            "/api/reports/{report_num}/versions/{ts}",
            get(handlers::get_report_version),
        )
        .route(
            "/api/reports/{report_num}/attachments/{filename}",
            get(handlers::download_attachment),
        )
        .with_state(state)
}
