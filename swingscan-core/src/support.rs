//! Support locator — which EMA is the nearest level the price sits just under.
//!
//! A period qualifies only when the current price is strictly below its EMA.
//! Periods are scanned in ascending order and the comparison is strict, so an
//! exact distance tie resolves to the lowest period.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The EMA acting as nearest support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportLevel {
    pub period: usize,
    pub level: f64,
    /// `|price - level| / level * 100`.
    pub distance_pct: f64,
}

/// Locator result: the chosen level (if any) and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportSearch {
    pub support: Option<SupportLevel>,
    /// Distance of the chosen level, `f64::INFINITY` when none qualified.
    pub min_distance_pct: f64,
}

impl SupportSearch {
    pub fn none() -> Self {
        Self {
            support: None,
            min_distance_pct: f64::INFINITY,
        }
    }
}

/// Percentage distance of `price` from `level`.
pub fn distance_pct(price: f64, level: f64) -> f64 {
    (price - level).abs() / level * 100.0
}

/// Find the nearest EMA above `current_price`.
pub fn locate(current_price: f64, ema_by_period: &BTreeMap<usize, Option<f64>>) -> SupportSearch {
    if !current_price.is_finite() {
        return SupportSearch::none();
    }

    let mut best = SupportSearch::none();
    for (&period, ema) in ema_by_period {
        let Some(level) = ema.filter(|v| v.is_finite() && *v != 0.0) else {
            continue;
        };
        if current_price >= level {
            continue;
        }
        let distance = distance_pct(current_price, level);
        if distance < best.min_distance_pct {
            best = SupportSearch {
                support: Some(SupportLevel {
                    period,
                    level,
                    distance_pct: distance,
                }),
                min_distance_pct: distance,
            };
        }
    }
    best
}
