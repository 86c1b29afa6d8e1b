//! Weekly series source trait and structured error types.
//!
//! `WeeklySeriesSource` abstracts over where bars come from (Yahoo Finance,
//! the synthetic generator, test doubles) so the batch runner never knows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, WeeklyBar};

/// Structured error types for data operations.
///
/// Displayable in logs and in the report's skipped-ticker table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {ticker}")]
    SymbolNotFound { ticker: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful weekly fetch for a single ticker.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub ticker: String,
    /// Bars in ascending date order.
    pub bars: Vec<WeeklyBar>,
    pub source: DataSource,
}

impl FetchResult {
    pub fn series(&self) -> PriceSeries {
        PriceSeries::from_bars(&self.bars)
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    Synthetic,
}

/// Supplies weekly bars for one ticker at a time.
///
/// Implementations must be safe to call from several worker threads at once.
/// An empty or short history is a valid `Ok`; the calculator decides whether
/// it is enough.
pub trait WeeklySeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the full weekly history for a ticker, oldest bar first.
    fn fetch_weekly(&self, ticker: &str) -> Result<FetchResult, DataError>;

    /// Whether the source is currently accepting requests.
    fn is_available(&self) -> bool {
        true
    }
}
