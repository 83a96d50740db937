use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::exports::handlers;
use crate::features::exports::services::ExportService;

/// Spreadsheet downloads (require auth middleware to be applied by caller)
pub fn routes(export_service: Arc<ExportService>) -> Router {
    Router::new()
        .route("/api/reports/export", get(handlers::export_all_reports))
        .route(
            "/api/reports/{report_num}/export",
            get(handlers::export_report),
        )
        .route(
            "/api/reports/{report_num}/export/{ts}",
            get(handlers::export_report_version),
        )
        .with_state(export_service)
}
