//! Opportunity evaluator — the qualification predicate of the screen.
//!
//! A ticker qualifies when all of the following hold at its latest bar:
//! 1. a support EMA was located above the price,
//! 2. the price is within `max_support_distance_pct` of it,
//! 3. RSI is defined and below `momentum_ceiling`,
//! 4. the MACD bullish flag is set.
//!
//! [`Opportunity`] can only be built here, so every instance carries a defined
//! support level, a defined momentum value and a bullish trend pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::IndicatorSnapshot;
use crate::support::{SupportLevel, SupportSearch};

/// Thresholds for the qualification predicate and the rating derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenCriteria {
    /// Maximum distance below the support EMA, in percent (inclusive).
    pub max_support_distance_pct: f64,
    /// RSI must be strictly below this.
    pub momentum_ceiling: f64,
    /// RSI below this is described as oversold in reports.
    pub oversold_below: f64,
    /// Distance below this rates as [`Rating::Strong`].
    pub strong_below_pct: f64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            max_support_distance_pct: 3.0,
            momentum_ceiling: 50.0,
            oversold_below: 40.0,
            strong_below_pct: 1.5,
        }
    }
}

/// The first qualification condition a ticker failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    NoSupport,
    SupportTooFar { distance_pct: f64 },
    MomentumUndefined,
    MomentumTooHigh { momentum: f64 },
    TrendNotBullish,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoSupport => write!(f, "no EMA above price"),
            Rejection::SupportTooFar { distance_pct } => {
                write!(f, "support {distance_pct:.2}% away")
            }
            Rejection::MomentumUndefined => write!(f, "RSI undefined"),
            Rejection::MomentumTooHigh { momentum } => write!(f, "RSI {momentum:.2} too high"),
            Rejection::TrendNotBullish => write!(f, "MACD not bullish"),
        }
    }
}

/// Main/signal values of a MACD reading that passed the bullish check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BullishTrend {
    main: f64,
    signal: f64,
}

impl BullishTrend {
    pub fn main(&self) -> f64 {
        self.main
    }

    pub fn signal(&self) -> f64 {
        self.signal
    }
}

/// Rating shown next to an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Strong,
    Moderate,
}

impl Rating {
    pub fn from_distance(distance_pct: f64, strong_below_pct: f64) -> Self {
        if distance_pct < strong_below_pct {
            Rating::Strong
        } else {
            Rating::Moderate
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Strong => write!(f, "Strong Buy"),
            Rating::Moderate => write!(f, "Buy"),
        }
    }
}

/// A qualifying swing setup. Terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    ticker: String,
    current_close: f64,
    support: SupportLevel,
    momentum: f64,
    trend: BullishTrend,
}

impl Opportunity {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn current_close(&self) -> f64 {
        self.current_close
    }

    pub fn support(&self) -> &SupportLevel {
        &self.support
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn trend(&self) -> &BullishTrend {
        &self.trend
    }

    pub fn rating(&self, strong_below_pct: f64) -> Rating {
        Rating::from_distance(self.support.distance_pct, strong_below_pct)
    }
}

/// Applies [`ScreenCriteria`] to a snapshot and its support search.
#[derive(Debug, Clone, Default)]
pub struct OpportunityEvaluator {
    criteria: ScreenCriteria,
}

impl OpportunityEvaluator {
    pub fn new(criteria: ScreenCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &ScreenCriteria {
        &self.criteria
    }

    /// Emit an opportunity if every condition holds.
    pub fn evaluate(
        &self,
        ticker: &str,
        snapshot: &IndicatorSnapshot,
        search: &SupportSearch,
    ) -> Option<Opportunity> {
        self.check(ticker, snapshot, search).ok()
    }

    /// Like [`evaluate`](Self::evaluate) but reports the first failed condition.
    pub fn check(
        &self,
        ticker: &str,
        snapshot: &IndicatorSnapshot,
        search: &SupportSearch,
    ) -> Result<Opportunity, Rejection> {
        let support = search.support.ok_or(Rejection::NoSupport)?;

        if support.distance_pct.is_nan()
            || support.distance_pct > self.criteria.max_support_distance_pct
        {
            return Err(Rejection::SupportTooFar {
                distance_pct: support.distance_pct,
            });
        }

        let momentum = snapshot.momentum.ok_or(Rejection::MomentumUndefined)?;
        if momentum.is_nan() || momentum >= self.criteria.momentum_ceiling {
            return Err(Rejection::MomentumTooHigh { momentum });
        }

        let trend = match (snapshot.trend_bullish, snapshot.trend_main, snapshot.trend_signal) {
            (true, Some(main), Some(signal)) => BullishTrend { main, signal },
            _ => return Err(Rejection::TrendNotBullish),
        };

        Ok(Opportunity {
            ticker: ticker.to_string(),
            current_close: snapshot.current_close,
            support,
            momentum,
            trend,
        })
    }
}
