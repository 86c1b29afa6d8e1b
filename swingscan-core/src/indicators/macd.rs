//! Moving Average Convergence Divergence (MACD), the trend oscillator of the screen.
//!
//! Main line = EMA(fast) - EMA(slow).
//! Signal line = EMA(signal) of the main line, seeded from its first `signal`
//! defined values.
//! Lookback: slow - 1 for the main line, slow + signal - 2 for the signal line.

use super::ema::ema_of_series;
use super::Indicator;

/// MACD main/signal line pair, both aligned to the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub main: Vec<f64>,
    pub signal: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    /// Standard 12/26/9 configuration.
    pub fn default_params() -> Self {
        Self::new(12, 26, 9)
    }

    /// Bars consumed before the signal line is first defined.
    pub fn signal_lookback(&self) -> usize {
        self.slow + self.signal - 2
    }

    /// Compute both lines over the full close series.
    pub fn lines(&self, closes: &[f64]) -> MacdLines {
        let n = closes.len();
        let mut main = vec![f64::NAN; n];
        let mut signal = vec![f64::NAN; n];

        if n < self.slow {
            return MacdLines { main, signal };
        }

        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        for i in (self.slow - 1)..n {
            main[i] = fast[i] - slow[i];
        }

        let start = self.slow - 1;
        let smoothed = ema_of_series(&main[start..], self.signal);
        for (offset, value) in smoothed.into_iter().enumerate() {
            signal[start + offset] = value;
        }

        MacdLines { main, signal }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        self.lines(closes).main
    }
}

/// Minimum number of bars with both lines defined before a crossover is judged.
pub const MIN_COMPARABLE_BARS: usize = 3;

/// Bullish state of the last bar.
///
/// True when either:
/// - the main line crossed above the signal line on the last bar
///   (main > signal now, main <= signal one bar prior), or
/// - main has been above signal for the last two bars and both lines rose
///   bar-over-bar.
///
/// False when fewer than [`MIN_COMPARABLE_BARS`] bars carry both lines, or any
/// of the four values involved is not finite.
pub fn bullish_crossover(main: &[f64], signal: &[f64]) -> bool {
    let comparable = main
        .iter()
        .zip(signal)
        .filter(|(m, s)| m.is_finite() && s.is_finite())
        .count();
    if comparable < MIN_COMPARABLE_BARS {
        return false;
    }

    let n = main.len().min(signal.len());
    let (main_cur, signal_cur) = (main[n - 1], signal[n - 1]);
    let (main_prev, signal_prev) = (main[n - 2], signal[n - 2]);

    if !(main_cur.is_finite()
        && signal_cur.is_finite()
        && main_prev.is_finite()
        && signal_prev.is_finite())
    {
        return false;
    }

    let fresh_cross = main_cur > signal_cur && main_prev <= signal_prev;
    let rising_above = main_cur > signal_cur
        && main_prev > signal_prev
        && main_cur > main_prev
        && signal_cur > signal_prev;

    fresh_cross || rising_above
}
