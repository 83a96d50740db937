use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::core::error::Result;
use crate::features::reports::models::{AttachedFile, NewAttachment, ReportFields, SpillReport};

use super::ReportRepository;

/// In-memory store with the same ordering rules as the SQL one
#[derive(Default)]
pub struct MemoryReportRepository {
    pub rows: Mutex<Vec<SpillReport>>,
    pub attachments: Mutex<Vec<AttachedFile>>,
    pub staff_names: Mutex<HashMap<i32, String>>,
    pub map_refreshes: Mutex<Vec<String>>,
    sequence: AtomicI64,
}

impl MemoryReportRepository {
    pub async fn row_count(&self, report_num: &str) -> usize {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|r| r.fields.report_num == report_num)
            .count()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn next_report_sequence(&self) -> Result<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert_version(
        &self,
        last_updated: DateTime<Utc>,
        fields: &ReportFields,
    ) -> Result<SpillReport> {
        let mut rows = self.rows.lock().await;
        let report = SpillReport {
            id: rows.len() as i32 + 1,
            last_updated,
            fields: fields.clone(),
        };
        rows.push(report.clone());
        Ok(report)
    }

    async fn latest_versions(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<SpillReport>> {
        let mut matching: Vec<SpillReport> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| r.fields.report_num == report_num)
            .filter(|r| at.is_none_or(|at| r.last_updated <= at))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.last_updated, b.id).cmp(&(a.last_updated, a.id)));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn count_versions(&self, report_num: &str) -> Result<i64> {
        Ok(self.row_count(report_num).await as i64)
    }

    async fn all_versions(&self) -> Result<Vec<SpillReport>> {
        Ok(self.rows.lock().await.clone())
    }

    async fn version_timestamps(&self, report_num: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut versions: Vec<(DateTime<Utc>, i32)> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| r.fields.report_num == report_num)
            .map(|r| (r.last_updated, r.id))
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions.into_iter().map(|(ts, _)| ts).collect())
    }

    async fn refresh_report_map(&self, report_num: &str) -> Result<()> {
        self.map_refreshes.lock().await.push(report_num.to_string());
        Ok(())
    }

    async fn insert_attachments(&self, attachments: &[NewAttachment]) -> Result<()> {
        let mut rows = self.attachments.lock().await;
        for attachment in attachments {
            let id = rows.len() as i32 + 1;
            rows.push(AttachedFile {
                id,
                report_num: attachment.report_num.clone(),
                filename: attachment.filename.clone(),
                file_type: attachment.file_type.clone(),
            });
        }
        Ok(())
    }

    async fn list_attachments(&self, report_num: &str) -> Result<Vec<AttachedFile>> {
        Ok(self
            .attachments
            .lock()
            .await
            .iter()
            .filter(|a| a.report_num == report_num)
            .cloned()
            .collect())
    }

    async fn find_staff_name(&self, user_id: i32) -> Result<Option<String>> {
        Ok(self.staff_names.lock().await.get(&user_id).cloned())
    }
}
