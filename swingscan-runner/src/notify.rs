//! Report delivery.
//!
//! `Notifier` is the seam between a finished scan and whoever reads it.
//! Two implementations ship:
//! - [`OutboxNotifier`]: drops the HTML body and a JSON envelope into a
//!   directory, for a mail relay or a human to pick up
//! - [`WebhookNotifier`]: POSTs the envelope plus body as JSON
//!
//! Delivery never fails a scan: [`deliver_all`] logs each failure and
//! returns per-notifier results for the caller to report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NotifySettings;
use crate::reporting::Report;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("webhook returned HTTP {status}")]
    Status { status: u16 },
}

/// Something that can hand a rendered report to its recipients.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `report`. Returns a short description of where it went.
    fn deliver(&self, report: &Report, recipients: &[String]) -> Result<String, NotifyError>;
}

/// Metadata that travels with every delivered report.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    subject: &'a str,
    recipients: &'a [String],
    generated_at: String,
}

// ─── Outbox ─────────────────────────────────────────────────────────

/// Writes `{stamp}.html` and `{stamp}.envelope.json` into a directory.
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), NotifyError> {
        std::fs::write(path, contents).map_err(|source| NotifyError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Notifier for OutboxNotifier {
    fn name(&self) -> &str {
        "outbox"
    }

    fn deliver(&self, report: &Report, recipients: &[String]) -> Result<String, NotifyError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| NotifyError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let stamp = report.generated_at.format("%Y%m%dT%H%M%SZ");
        let body_path = self.dir.join(format!("{stamp}.html"));
        let envelope_path = self.dir.join(format!("{stamp}.envelope.json"));

        let envelope = Envelope {
            subject: &report.subject,
            recipients,
            generated_at: report.generated_at.to_rfc3339(),
        };
        self.write(&body_path, report.html.as_bytes())?;
        self.write(&envelope_path, &serde_json::to_vec_pretty(&envelope)?)?;

        Ok(body_path.display().to_string())
    }
}

// ─── Webhook ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    envelope: Envelope<'a>,
    html: &'a str,
    markdown: &'a str,
}

/// POSTs `{subject, recipients, generated_at, html, markdown}` to a URL.
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    fn deliver(&self, report: &Report, recipients: &[String]) -> Result<String, NotifyError> {
        let payload = WebhookPayload {
            envelope: Envelope {
                subject: &report.subject,
                recipients,
                generated_at: report.generated_at.to_rfc3339(),
            },
            html: &report.html,
            markdown: &report.markdown,
        };
        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }
        Ok(self.url.clone())
    }
}

// ─── Fan-out ────────────────────────────────────────────────────────

/// Notifiers configured by `settings`, outbox first.
pub fn notifiers_from_settings(
    settings: &NotifySettings,
    timeout: Duration,
) -> Vec<Box<dyn Notifier>> {
    let mut out: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(dir) = &settings.outbox_dir {
        out.push(Box::new(OutboxNotifier::new(dir)));
    }
    if let Some(url) = &settings.webhook_url {
        match WebhookNotifier::new(url, timeout) {
            Ok(n) => out.push(Box::new(n)),
            Err(e) => warn!(error = %e, "webhook notifier disabled"),
        }
    }
    out
}

/// Outcome of one delivery attempt.
#[derive(Debug)]
pub struct DeliveryResult {
    pub notifier: String,
    pub result: Result<String, NotifyError>,
}

/// Deliver through every notifier; failures are logged, never propagated.
pub fn deliver_all(
    notifiers: &[Box<dyn Notifier>],
    report: &Report,
    recipients: &[String],
) -> Vec<DeliveryResult> {
    notifiers
        .iter()
        .map(|n| {
            let result = n.deliver(report, recipients);
            match &result {
                Ok(target) => info!(notifier = n.name(), %target, "report delivered"),
                Err(e) => warn!(notifier = n.name(), error = %e, "report delivery failed"),
            }
            DeliveryResult {
                notifier: n.name().to_string(),
                result,
            }
        })
        .collect()
}
