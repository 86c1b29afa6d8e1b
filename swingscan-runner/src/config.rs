//! Serializable scan configuration.
//!
//! One TOML file carries everything a scan needs. Every section and field has
//! a default, so an empty file (or no file) screens NIFTY 50 with the stock
//! thresholds:
//!
//! ```toml
//! [universe]
//! name = "NIFTY 50"
//! tickers = ["RELIANCE.NS", "TCS.NS"]
//!
//! [indicators]
//! ema_periods = [50, 100, 200]
//! min_bars = 200
//!
//! [criteria]
//! max_support_distance_pct = 3.0
//! momentum_ceiling = 50.0
//!
//! [runner]
//! workers = 4
//!
//! [notify]
//! recipients = ["desk@example.com"]
//! outbox_dir = "outbox"
//! ```
//!
//! Recipients and the webhook URL can also come from the environment
//! (`SWINGSCAN_RECIPIENTS`, `SWINGSCAN_WEBHOOK_URL`), which is how secrets
//! stay out of the checked-in file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use swingscan_core::data::{Universe, UniverseError};
use swingscan_core::{IndicatorParams, ScreenCriteria};

pub const ENV_RECIPIENTS: &str = "SWINGSCAN_RECIPIENTS";
pub const ENV_WEBHOOK_URL: &str = "SWINGSCAN_WEBHOOK_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
    #[error("universe file: {0}")]
    Universe(#[from] UniverseError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScreenConfig {
    pub universe: Universe,
    pub indicators: IndicatorParams,
    pub criteria: ScreenCriteria,
    pub runner: RunnerSettings,
    pub report: ReportSettings,
    pub notify: NotifySettings,
}

/// Batch execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Worker threads; 1 runs tickers sequentially.
    pub workers: usize,
    /// Per-request HTTP timeout for the price source.
    pub fetch_timeout_secs: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            fetch_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Directory that receives one timestamped folder per scan.
    pub output_dir: PathBuf,
    /// Prefix for prices in rendered reports.
    pub currency: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            currency: "₹".to_string(),
        }
    }
}

/// Report delivery. With no outbox and no webhook, nothing is delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotifySettings {
    pub recipients: Vec<String>,
    pub webhook_url: Option<String>,
    pub outbox_dir: Option<PathBuf>,
}

impl ScreenConfig {
    /// Load, apply environment overrides, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Replace the universe with a standalone universe file (the format
    /// `swingscan universe --out` writes), then re-validate.
    pub fn set_universe_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.universe = Universe::from_file(path)?;
        self.validate()
    }

    /// Override notify settings from `lookup` (normally the process
    /// environment, after `.env` has been loaded).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_RECIPIENTS) {
            let recipients: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
            if !recipients.is_empty() {
                self.notify.recipients = recipients;
            }
        }
        if let Some(url) = lookup(ENV_WEBHOOK_URL).filter(|u| !u.trim().is_empty()) {
            self.notify.webhook_url = Some(url.trim().to_string());
        }
    }

    /// Reject values the calculator or evaluator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.ema_periods.is_empty() {
            return invalid("indicators.ema_periods must not be empty");
        }
        if ind.ema_periods.contains(&0) {
            return invalid("indicators.ema_periods must all be >= 1");
        }
        if ind.momentum_period == 0 {
            return invalid("indicators.momentum_period must be >= 1");
        }
        if ind.trend_fast == 0 || ind.trend_slow == 0 || ind.trend_signal == 0 {
            return invalid("indicators trend windows must all be >= 1");
        }
        if ind.trend_fast >= ind.trend_slow {
            return invalid(format!(
                "indicators.trend_fast ({}) must be below trend_slow ({})",
                ind.trend_fast, ind.trend_slow
            ));
        }

        let crit = &self.criteria;
        for (name, value) in [
            ("max_support_distance_pct", crit.max_support_distance_pct),
            ("momentum_ceiling", crit.momentum_ceiling),
            ("oversold_below", crit.oversold_below),
            ("strong_below_pct", crit.strong_below_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("criteria.{name} must be a positive number, got {value}"));
            }
        }
        if crit.momentum_ceiling > 100.0 {
            return invalid("criteria.momentum_ceiling must not exceed 100");
        }

        if self.universe.normalized_tickers().is_empty() {
            return invalid("universe.tickers must contain at least one ticker");
        }
        if self.runner.workers == 0 {
            return invalid("runner.workers must be >= 1");
        }
        if self.runner.fetch_timeout_secs == 0 {
            return invalid("runner.fetch_timeout_secs must be >= 1");
        }
        Ok(())
    }

    /// Deterministic hash of everything that affects which tickers qualify.
    ///
    /// Delivery and output settings are excluded: moving the report folder
    /// does not change the screen.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(&(&self.universe, &self.indicators, &self.criteria))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

fn invalid<T>(msg: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}
