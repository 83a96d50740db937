use std::collections::HashMap;
use std::sync::Arc;

use minijinja::Value;

use crate::features::reports::services::SavedReport;
use crate::shared::constants::DEFAULT_MAILING_LIST;
use crate::shared::templates::{TemplateEngine, REPORT_UPDATE_TEMPLATE};

use super::mailer::{EmailMessage, MailError, Mailer};
use super::mailing_list_store::MailingListStore;

const UNTITLED_REPORT: &str = "Untitled";

/// Emails the update list whenever a report version is saved
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    lists: Arc<MailingListStore>,
    templates: TemplateEngine,
    site_url: String,
    default_recipients: Vec<String>,
}

impl NotificationService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        lists: Arc<MailingListStore>,
        templates: TemplateEngine,
        site_url: String,
        default_recipients: Vec<String>,
    ) -> Self {
        Self {
            mailer,
            lists,
            templates,
            site_url,
            default_recipients,
        }
    }

    /// Send the saved/updated email. Failures are logged, never returned.
    pub async fn notify_report_saved(&self, saved: &SavedReport) {
        let report_num = &saved.report.fields.report_num;
        if let Err(e) = self.try_notify(saved).await {
            tracing::error!(
                "Failed to send notification for report {}: {}",
                report_num,
                e
            );
        }
    }

    async fn try_notify(&self, saved: &SavedReport) -> Result<(), MailError> {
        let to = self.recipients().await;
        if to.is_empty() {
            tracing::warn!(
                "No recipients configured, skipping notification for report {}",
                saved.report.fields.report_num
            );
            return Ok(());
        }

        let message = EmailMessage {
            to,
            subject: subject_for(saved),
            html_body: self.render_body(saved)?,
        };
        self.mailer.send(&message).await
    }

    /// The default list from the mailing list file, else the configured fallback
    async fn recipients(&self) -> Vec<String> {
        match self.lists.recipients(DEFAULT_MAILING_LIST).await {
            Ok(Some(list)) if !list.is_empty() => list,
            Ok(_) => self.default_recipients.clone(),
            Err(e) => {
                tracing::warn!("Could not read mailing lists, using fallback: {}", e);
                self.default_recipients.clone()
            }
        }
    }

    fn render_body(&self, saved: &SavedReport) -> Result<String, MailError> {
        let fields = &saved.report.fields;
        let report_url = format!("{}/report/{}", self.site_url, fields.report_num);

        let mut ctx: HashMap<&str, Value> = HashMap::new();
        ctx.insert("report_title", Value::from(report_title(saved)));
        ctx.insert("report_num", Value::from(fields.report_num.as_str()));
        ctx.insert("version_count", Value::from(saved.version_count));
        ctx.insert("report_url", Value::from(report_url));
        ctx.insert("site_url", Value::from(self.site_url.as_str()));
        ctx.insert("pollutant", Value::from(fields.pollutant.clone()));
        ctx.insert("location", Value::from(fields.location_description.clone()));

        Ok(self.templates.render(REPORT_UPDATE_TEMPLATE, &ctx)?)
    }
}

fn report_title(saved: &SavedReport) -> &str {
    saved
        .report
        .fields
        .report_name
        .as_deref()
        .unwrap_or(UNTITLED_REPORT)
}

pub fn subject_for(saved: &SavedReport) -> String {
    let title = report_title(saved);
    let report_num = &saved.report.fields.report_num;
    if saved.version_count == 0 {
        format!("New Spill Report - {} ({})", title, report_num)
    } else {
        format!(
            "Updated Spill Report #{} - {} ({})",
            saved.version_count, title, report_num
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{ReportFields, SpillReport};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::path::PathBuf;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Rejected {
                    status: 503,
                    body: "relay down".to_string(),
                });
            }
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }

    fn saved(version_count: i64) -> SavedReport {
        SavedReport {
            report: SpillReport {
                id: 1,
                last_updated: DateTime::from_timestamp(1_000, 0).unwrap(),
                fields: ReportFields {
                    report_num: "2021-14".to_string(),
                    report_name: Some("Diesel sheen".to_string()),
                    pollutant: Some("Diesel".to_string()),
                    ..Default::default()
                },
            },
            version_count,
        }
    }

    fn list_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("spilltracker-notify-{}", uuid::Uuid::now_v7()))
            .join("mailing_lists.json")
    }

    fn service(mailer: Arc<RecordingMailer>, lists: Arc<MailingListStore>) -> NotificationService {
        NotificationService::new(
            mailer,
            lists,
            TemplateEngine::builtin(),
            "https://spills.example.org".to_string(),
            vec!["fallback@example.org".to_string()],
        )
    }

    #[test]
    fn test_subjects() {
        assert_eq!(
            subject_for(&saved(0)),
            "New Spill Report - Diesel sheen (2021-14)"
        );
        assert_eq!(
            subject_for(&saved(3)),
            "Updated Spill Report #3 - Diesel sheen (2021-14)"
        );
    }

    #[tokio::test]
    async fn test_uses_default_mailing_list() {
        let path = list_path();
        let lists = Arc::new(MailingListStore::new(path.clone()));
        lists
            .save(DEFAULT_MAILING_LIST, vec!["duty@example.org".to_string()])
            .await
            .unwrap();
        let mailer = Arc::new(RecordingMailer::default());

        service(mailer.clone(), lists).notify_report_saved(&saved(2)).await;

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["duty@example.org".to_string()]);
        assert!(sent[0].subject.starts_with("Updated Spill Report #2"));
        assert!(sent[0]
            .html_body
            .contains("https://spills.example.org/report/2021-14"));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_falls_back_to_default_recipients() {
        let lists = Arc::new(MailingListStore::new(list_path()));
        let mailer = Arc::new(RecordingMailer::default());

        service(mailer.clone(), lists).notify_report_saved(&saved(0)).await;

        let sent = mailer.sent.lock().await;
        assert_eq!(sent[0].to, vec!["fallback@example.org".to_string()]);
        assert!(sent[0].html_body.contains("Created"));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let lists = Arc::new(MailingListStore::new(list_path()));
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });

        service(mailer.clone(), lists).notify_report_saved(&saved(1)).await;
        assert!(mailer.sent.lock().await.is_empty());
    }
}
