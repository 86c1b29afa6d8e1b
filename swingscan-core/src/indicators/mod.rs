//! Indicator implementations over weekly close series.
//!
//! Every indicator maps a close slice to an output series of the same length.
//! Warmup positions are `f64::NAN`; callers read the last value and treat a
//! non-finite result as "undefined" rather than as a number.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::{ema_of_series, Ema};
pub use macd::{bullish_crossover, Macd, MacdLines};
pub use rsi::Rsi;

/// Trait for close-series indicators.
///
/// # Look-ahead guard
/// The value at index t depends only on closes `0..=t`. Computing on a prefix
/// must reproduce the same values for the overlapping indices.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars consumed before the first defined output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the full close series.
    ///
    /// Returns a `Vec<f64>` of the same length as `closes`; the first
    /// `lookback()` values are `f64::NAN`.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Last value of an indicator series, or `None` when it is missing or non-finite.
pub fn last_defined(values: &[f64]) -> Option<f64> {
    values.last().copied().filter(|v| v.is_finite())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
