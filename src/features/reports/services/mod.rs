mod diff;
mod display;
mod report_service;

pub use display::version_key;
pub use report_service::{ReportService, SavedReport};
