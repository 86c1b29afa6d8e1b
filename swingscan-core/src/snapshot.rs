//! Indicator calculator — one weekly close series in, one immutable snapshot out.
//!
//! The calculator is pure: no I/O, no shared state, identical input always
//! yields a bit-identical snapshot. Insufficient history is not an error; it
//! shows up as `None` (whole series too short) or as an undefined field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::indicators::{bullish_crossover, last_defined, Ema, Indicator, Macd, Rsi};

/// Indicator windows and the data-sufficiency gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// EMA periods examined as support candidates.
    pub ema_periods: Vec<usize>,
    /// RSI window.
    pub momentum_period: usize,
    pub trend_fast: usize,
    pub trend_slow: usize,
    pub trend_signal: usize,
    /// Minimum number of finite closes before any computation is attempted.
    pub min_bars: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_periods: vec![50, 100, 200],
            momentum_period: 14,
            trend_fast: 12,
            trend_slow: 26,
            trend_signal: 9,
            min_bars: 200,
        }
    }
}

/// Everything the screen knows about one ticker at its latest weekly bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Latest finite close.
    pub current_close: f64,
    /// EMA per period; `None` when the series is shorter than the period.
    pub ema_by_period: BTreeMap<usize, Option<f64>>,
    /// RSI in [0, 100], `None` when undefined.
    pub momentum: Option<f64>,
    pub trend_main: Option<f64>,
    pub trend_signal: Option<f64>,
    pub trend_bullish: bool,
    /// Number of finite closes the snapshot was computed from.
    pub bar_count: usize,
}

impl IndicatorSnapshot {
    pub fn ema(&self, period: usize) -> Option<f64> {
        self.ema_by_period.get(&period).copied().flatten()
    }
}

/// Builds [`IndicatorSnapshot`]s from close series.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    params: IndicatorParams,
    emas: Vec<Ema>,
    rsi: Rsi,
    macd: Macd,
}

impl IndicatorCalculator {
    /// Panics if any window is zero or `trend_slow <= trend_fast`; configs are
    /// validated before they get here.
    pub fn new(params: IndicatorParams) -> Self {
        let mut periods = params.ema_periods.clone();
        periods.sort_unstable();
        periods.dedup();
        let emas = periods.into_iter().map(Ema::new).collect();
        let rsi = Rsi::new(params.momentum_period);
        let macd = Macd::new(params.trend_fast, params.trend_slow, params.trend_signal);
        Self {
            params,
            emas,
            rsi,
            macd,
        }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute the snapshot for the latest bar of `series`.
    ///
    /// Non-finite closes are dropped first. Returns `None` if fewer than
    /// `min_bars` finite closes remain.
    pub fn compute(&self, series: &PriceSeries) -> Option<IndicatorSnapshot> {
        let clean = series.finite();
        if clean.len() < self.params.min_bars {
            return None;
        }
        let closes = clean.closes();
        let current_close = clean.last()?;

        let ema_by_period = self
            .emas
            .iter()
            .map(|ema| {
                let value = if closes.len() < ema.period() {
                    None
                } else {
                    last_defined(&ema.compute(closes))
                };
                (ema.period(), value)
            })
            .collect();

        let momentum =
            last_defined(&self.rsi.compute(closes)).filter(|v| (0.0..=100.0).contains(v));

        let lines = self.macd.lines(closes);

        Some(IndicatorSnapshot {
            current_close,
            ema_by_period,
            momentum,
            trend_main: last_defined(&lines.main),
            trend_signal: last_defined(&lines.signal),
            trend_bullish: bullish_crossover(&lines.main, &lines.signal),
            bar_count: closes.len(),
        })
    }
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self::new(IndicatorParams::default())
    }
}
