mod export_service;

pub use export_service::{CsvExport, ExportService};
