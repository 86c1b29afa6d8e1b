//! SwingScan Core — the weekly swing-setup signal engine.
//!
//! Per ticker, data flows one way:
//! weekly closes → [`IndicatorSnapshot`] → [`SupportSearch`] → [`Opportunity`].
//!
//! - Domain types (weekly bars, price series)
//! - Indicators (EMA, RSI, MACD) and the snapshot calculator
//! - Support locator and opportunity evaluator
//! - Weekly price sources (Yahoo Finance, synthetic) and the universe list
//!
//! Everything except the Yahoo source is pure and synchronous.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod opportunity;
pub mod snapshot;
pub mod support;

pub use domain::{PriceSeries, Ticker, WeeklyBar};
pub use opportunity::{
    BullishTrend, Opportunity, OpportunityEvaluator, Rating, Rejection, ScreenCriteria,
};
pub use snapshot::{IndicatorCalculator, IndicatorParams, IndicatorSnapshot};
pub use support::{locate, SupportLevel, SupportSearch};
