//! Weekly bar — one aggregated price observation per week.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single ticker covering one trading week.
///
/// `close` is already adjusted for splits and dividends when the source
/// supports it. Missing fields from the provider arrive as `f64::NAN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
