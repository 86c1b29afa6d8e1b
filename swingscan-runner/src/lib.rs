//! SwingScan Runner — scan orchestration, reports, delivery.
//!
//! This crate builds on `swingscan-core` to provide:
//! - TOML configuration with environment overrides and a config fingerprint
//! - The batch runner (bounded worker pool, universe-ordered results)
//! - HTML and Markdown reports plus CSV/JSON artifacts
//! - Report delivery through pluggable notifiers
//! - Tracing subscriber setup

pub mod batch;
pub mod config;
pub mod logging;
pub mod notify;
pub mod reporting;

pub use batch::{BatchRunner, ScanError, ScanSummary, TickerOutcome, TickerResult};
pub use config::{ConfigError, NotifySettings, ReportSettings, RunnerSettings, ScreenConfig};
pub use logging::{init_logging, LogFormat};
pub use notify::{
    deliver_all, notifiers_from_settings, DeliveryResult, Notifier, NotifyError, OutboxNotifier,
    WebhookNotifier,
};
pub use reporting::{HtmlReportGenerator, MarkdownReportGenerator, Report};
