use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;

use crate::core::config::NotificationConfig;
use crate::core::error::AppError;
use crate::shared::constants::MAIL_RELAY_TIMEOUT_SECS;
use crate::shared::templates::TemplateError;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mailing list file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mailing list file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail relay rejected message: status={status} body={body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid mail relay API key")]
    InvalidApiKey,

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Outgoing mail channel
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail relay
pub struct HttpRelayMailer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    sender: String,
    sender_name: String,
}

impl HttpRelayMailer {
    pub fn new(
        url: String,
        api_key: Option<String>,
        sender: String,
        sender_name: String,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(MAIL_RELAY_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url,
            api_key,
            sender,
            sender_name,
        })
    }

    fn headers(&self) -> Result<HeaderMap, MailError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| MailError::InvalidApiKey)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = serde_json::json!({
            "from": {"email": self.sender, "name": self.sender_name},
            "to": message.to,
            "subject": message.subject,
            "html": message.html_body,
        });

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        tracing::info!(
            "Sent '{}' to {} recipient(s)",
            message.subject,
            message.to.len()
        );
        Ok(())
    }
}

/// Used when NOTIFY_EMAILS is off
pub struct LogOnlyMailer;

#[async_trait]
impl Mailer for LogOnlyMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        tracing::warn!(
            "Email notifications disabled, not sending '{}' to {}",
            message.subject,
            message.to.join(", ")
        );
        Ok(())
    }
}

pub fn build_mailer(config: &NotificationConfig) -> Arc<dyn Mailer> {
    let Some(url) = config.relay_url.as_ref().filter(|_| config.enabled) else {
        return Arc::new(LogOnlyMailer);
    };
    match HttpRelayMailer::new(
        url.clone(),
        config.relay_api_key.clone(),
        config.sender.clone(),
        config.sender_name.clone(),
    ) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::error!("Failed to build mail relay client, emails will be logged only: {}", e);
            Arc::new(LogOnlyMailer)
        }
    }
}

fn truncate(s: &str) -> String {
    const MAX: usize = 512;
    match s.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(enabled: bool, relay_url: Option<&str>) -> NotificationConfig {
        NotificationConfig {
            enabled,
            relay_url: relay_url.map(str::to_string),
            relay_api_key: Some("secret".to_string()),
            sender: "updates@example.org".to_string(),
            sender_name: "Spill Tracker".to_string(),
            mailing_list_file: PathBuf::from("mailing_lists.json"),
            default_recipients: vec![],
        }
    }

    #[tokio::test]
    async fn test_log_only_mailer_succeeds() {
        let message = EmailMessage {
            to: vec!["duty@example.org".to_string()],
            subject: "New Spill Report - Sheen (2021-14)".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };
        assert!(LogOnlyMailer.send(&message).await.is_ok());
        assert!(build_mailer(&config(false, Some("http://relay"))).send(&message).await.is_ok());
    }

    #[test]
    fn test_relay_headers() {
        let mailer = HttpRelayMailer::new(
            "http://relay".to_string(),
            Some("secret".to_string()),
            "updates@example.org".to_string(),
            "Spill Tracker".to_string(),
        )
        .unwrap();
        let headers = mailer.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[CONTENT_TYPE], "application/json");

        let bad = HttpRelayMailer::new(
            "http://relay".to_string(),
            Some("bad\nkey".to_string()),
            String::new(),
            String::new(),
        )
        .unwrap();
        assert!(matches!(bad.headers(), Err(MailError::InvalidApiKey)));
    }

    #[tokio::test]
    async fn test_unresponsive_relay_times_out() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _held = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let mailer = HttpRelayMailer::new(
            format!("http://{}/send", addr),
            None,
            "updates@example.org".to_string(),
            "Spill Tracker".to_string(),
        )
        .unwrap();
        let message = EmailMessage {
            to: vec!["duty@example.org".to_string()],
            subject: "New Spill Report - Sheen (2021-14)".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };

        let started = std::time::Instant::now();
        let err = mailer.send(&message).await.unwrap_err();
        assert!(matches!(err, MailError::Http(ref e) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(MAIL_RELAY_TIMEOUT_SECS + 5));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(600);
        assert_eq!(truncate(&long).len(), 515);
    }
}
