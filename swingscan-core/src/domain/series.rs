//! PriceSeries — the chronological weekly closes a snapshot is computed from.

use super::bar::WeeklyBar;

/// Ordered weekly closing prices, oldest first.
///
/// Immutable once built. The series may contain non-finite values straight
/// from the provider; [`PriceSeries::finite`] returns the cleaned copy the
/// indicator calculator works on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn from_closes(closes: Vec<f64>) -> Self {
        Self { closes }
    }

    /// Build a series from bars. Bars must already be in date order.
    pub fn from_bars(bars: &[WeeklyBar]) -> Self {
        Self {
            closes: bars.iter().map(|b| b.close).collect(),
        }
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Latest close, if any.
    pub fn last(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Copy of the series with NaN and infinite values dropped.
    pub fn finite(&self) -> Self {
        Self {
            closes: self
                .closes
                .iter()
                .copied()
                .filter(|c| c.is_finite())
                .collect(),
        }
    }

    /// First `len` closes as a new series (clamped to the series length).
    pub fn prefix(&self, len: usize) -> Self {
        let end = len.min(self.closes.len());
        Self {
            closes: self.closes[..end].to_vec(),
        }
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(closes: Vec<f64>) -> Self {
        Self::from_closes(closes)
    }
}
