//! Persistence for versioned spill reports.
//!
//! Every save is a pure insert; the current state of a report is the row with
//! the greatest `last_updated` for its report number.

mod pg_repository;

#[cfg(test)]
pub mod memory_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::reports::models::{AttachedFile, NewAttachment, ReportFields, SpillReport};

pub use pg_repository::PgReportRepository;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Next value of the report number sequence
    async fn next_report_sequence(&self) -> Result<i64>;

    /// Append a new version row
    async fn insert_version(
        &self,
        last_updated: DateTime<Utc>,
        fields: &ReportFields,
    ) -> Result<SpillReport>;

    /// Newest versions first, optionally only those saved at or before `at`
    async fn latest_versions(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<SpillReport>>;

    async fn count_versions(&self, report_num: &str) -> Result<i64>;

    /// Every stored row of every report
    async fn all_versions(&self) -> Result<Vec<SpillReport>>;

    /// Version timestamps, newest first
    async fn version_timestamps(&self, report_num: &str) -> Result<Vec<DateTime<Utc>>>;

    /// Rebuild the map row for one report number
    async fn refresh_report_map(&self, report_num: &str) -> Result<()>;

    /// Insert all rows or none
    async fn insert_attachments(&self, attachments: &[NewAttachment]) -> Result<()>;

    async fn list_attachments(&self, report_num: &str) -> Result<Vec<AttachedFile>>;

    async fn find_staff_name(&self, user_id: i32) -> Result<Option<String>>;
}
