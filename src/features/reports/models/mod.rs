mod attached_file;
mod spill_report;

pub use attached_file::{AttachedFile, NewAttachment};
pub use spill_report::{ReportFields, ReportVersions, SpillReport};
