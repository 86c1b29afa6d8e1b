//! Batch runner — walks the universe and screens every ticker.
//!
//! Per ticker: fetch → snapshot → locate support → evaluate. Tickers are
//! independent, so they run on a bounded rayon pool; results are collected
//! with an indexed `collect`, which keeps universe order regardless of which
//! worker finishes first. A ticker that cannot be fetched or has too little
//! history becomes an outcome in the summary, never an error: the batch always
//! completes.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use swingscan_core::data::{DataSource, WeeklySeriesSource};
use swingscan_core::{
    locate, IndicatorCalculator, IndicatorParams, IndicatorSnapshot, Opportunity,
    OpportunityEvaluator, Rejection, ScreenCriteria,
};

use crate::config::{ConfigError, ScreenConfig};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What happened to one ticker.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Qualified { opportunity: Opportunity },
    ScreenedOut { rejection: Rejection },
    /// Fewer finite closes than the sufficiency gate requires.
    InsufficientData { bars: usize, required: usize },
    FetchFailed { error: String },
}

impl TickerOutcome {
    pub fn opportunity(&self) -> Option<&Opportunity> {
        match self {
            TickerOutcome::Qualified { opportunity } => Some(opportunity),
            _ => None,
        }
    }

    /// Short label for tables and logs.
    pub fn label(&self) -> &'static str {
        match self {
            TickerOutcome::Qualified { .. } => "qualified",
            TickerOutcome::ScreenedOut { .. } => "screened out",
            TickerOutcome::InsufficientData { .. } => "insufficient data",
            TickerOutcome::FetchFailed { .. } => "fetch failed",
        }
    }

    /// One-line detail for skipped tickers.
    pub fn detail(&self) -> String {
        match self {
            TickerOutcome::Qualified { opportunity } => {
                let support = opportunity.support();
                format!("{:.2}% under EMA{}", support.distance_pct, support.period)
            }
            TickerOutcome::ScreenedOut { rejection } => rejection.to_string(),
            TickerOutcome::InsufficientData { bars, required } => {
                format!("{bars} weekly bars, need {required}")
            }
            TickerOutcome::FetchFailed { error } => error.clone(),
        }
    }
}

/// Everything the runner learned about one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TickerResult {
    pub ticker: String,
    pub source: Option<DataSource>,
    /// Bars returned by the source, before non-finite closes are dropped.
    pub bars: usize,
    pub last_bar: Option<NaiveDate>,
    pub snapshot: Option<IndicatorSnapshot>,
    pub outcome: TickerOutcome,
}

/// Result of one scan over a universe.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub universe: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub config_fingerprint: String,
    pub source: String,
    pub indicators: IndicatorParams,
    pub criteria: ScreenCriteria,
    /// One entry per ticker, in universe order.
    pub results: Vec<TickerResult>,
}

impl ScanSummary {
    /// Qualifying opportunities, in universe order.
    pub fn opportunities(&self) -> Vec<&Opportunity> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.opportunity())
            .collect()
    }

    /// Tickers that were not screened at all (fetch failure or short history).
    pub fn skipped(&self) -> Vec<&TickerResult> {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    TickerOutcome::FetchFailed { .. } | TickerOutcome::InsufficientData { .. }
                )
            })
            .collect()
    }

    pub fn screened_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    TickerOutcome::Qualified { .. } | TickerOutcome::ScreenedOut { .. }
                )
            })
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, TickerOutcome::FetchFailed { .. }))
            .count()
    }
}

/// Screens a universe against one source.
pub struct BatchRunner<'a> {
    source: &'a dyn WeeklySeriesSource,
    calculator: IndicatorCalculator,
    evaluator: OpportunityEvaluator,
    universe: String,
    tickers: Vec<String>,
    fingerprint: String,
    workers: usize,
}

impl<'a> BatchRunner<'a> {
    /// Build a runner from a validated config.
    pub fn new(source: &'a dyn WeeklySeriesSource, config: &ScreenConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            source,
            calculator: IndicatorCalculator::new(config.indicators.clone()),
            evaluator: OpportunityEvaluator::new(config.criteria.clone()),
            universe: config.universe.name.clone(),
            tickers: config.universe.normalized_tickers(),
            fingerprint: config.fingerprint()?,
            workers: config.runner.workers,
        })
    }

    /// Override the worker count (clamped to at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Run the full pipeline for one ticker.
    pub fn screen(&self, ticker: &str) -> TickerResult {
        info!(ticker, "analysing");

        let fetched = match self.source.fetch_weekly(ticker) {
            Ok(f) => f,
            Err(e) => {
                warn!(ticker, error = %e, "fetch failed, skipping");
                return TickerResult {
                    ticker: ticker.to_string(),
                    source: None,
                    bars: 0,
                    last_bar: None,
                    snapshot: None,
                    outcome: TickerOutcome::FetchFailed {
                        error: e.to_string(),
                    },
                };
            }
        };

        let series = fetched.series();
        let source = Some(fetched.source);
        let bars = fetched.bars.len();
        let last_bar = fetched.bars.last().map(|b| b.date);

        let Some(snapshot) = self.calculator.compute(&series) else {
            let required = self.calculator.params().min_bars;
            let finite = series.finite().len();
            warn!(ticker, bars = finite, required, "insufficient weekly history, skipping");
            return TickerResult {
                ticker: ticker.to_string(),
                source,
                bars,
                last_bar,
                snapshot: None,
                outcome: TickerOutcome::InsufficientData {
                    bars: finite,
                    required,
                },
            };
        };

        let search = locate(snapshot.current_close, &snapshot.ema_by_period);
        let outcome = match self.evaluator.check(ticker, &snapshot, &search) {
            Ok(opportunity) => {
                info!(
                    ticker,
                    support = opportunity.support().period,
                    distance_pct = opportunity.support().distance_pct,
                    rsi = opportunity.momentum(),
                    "opportunity"
                );
                TickerOutcome::Qualified { opportunity }
            }
            Err(rejection) => {
                debug!(ticker, %rejection, "screened out");
                TickerOutcome::ScreenedOut { rejection }
            }
        };

        TickerResult {
            ticker: ticker.to_string(),
            source,
            bars,
            last_bar,
            snapshot: Some(snapshot),
            outcome,
        }
    }

    /// Screen every ticker in the universe.
    pub fn run(&self) -> Result<ScanSummary, ScanError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            universe = %self.universe,
            tickers = self.tickers.len(),
            workers = self.workers,
            source = self.source.name(),
            "scan started"
        );

        let results: Vec<TickerResult> = if self.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()?;
            pool.install(|| self.tickers.par_iter().map(|t| self.screen(t)).collect())
        } else {
            self.tickers.iter().map(|t| self.screen(t)).collect()
        };

        let summary = ScanSummary {
            universe: self.universe.clone(),
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            config_fingerprint: self.fingerprint.clone(),
            source: self.source.name().to_string(),
            indicators: self.calculator.params().clone(),
            criteria: self.evaluator.criteria().clone(),
            results,
        };
        info!(
            opportunities = summary.opportunities().len(),
            screened = summary.screened_count(),
            skipped = summary.skipped().len(),
            elapsed_ms = summary.elapsed_ms,
            "scan finished"
        );
        Ok(summary)
    }
}
