//! Property tests for screen invariants.
//!
//! Uses proptest to verify:
//! 1. RSI bounds — every defined RSI value lies in [0, 100]
//! 2. EMA of a constant — converges to (stays at) that constant
//! 3. Determinism — the calculator is a pure function of its input
//! 4. Support locator — never picks an undefined level or one at/below price
//! 5. Evaluator — never emits unless all four conditions hold
//! 6. Sufficiency gate — short series always yield no snapshot

use std::collections::BTreeMap;

use proptest::prelude::*;
use swingscan_core::indicators::{ema_of_series, Indicator, Rsi};
use swingscan_core::{
    locate, IndicatorCalculator, IndicatorSnapshot, OpportunityEvaluator, PriceSeries,
    ScreenCriteria,
};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Weekly random walk: a start price and bounded percentage steps.
fn arb_walk(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (
        10.0..5000.0_f64,
        prop::collection::vec(-0.15..0.15_f64, min_len..max_len),
    )
        .prop_map(|(start, steps)| {
            let mut price = start;
            let mut closes = Vec::with_capacity(steps.len() + 1);
            closes.push(price);
            for step in steps {
                price = (price * (1.0 + step)).max(0.01);
                closes.push(price);
            }
            closes
        })
}

fn arb_level() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
        1 => Just(Some(0.0)),
        6 => (1.0..500.0_f64).prop_map(Some),
    ]
}

fn arb_ema_map() -> impl Strategy<Value = BTreeMap<usize, Option<f64>>> {
    prop::collection::btree_map(1usize..400, arb_level(), 0..6)
}

// ── 1. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_stays_within_bounds(closes in arb_walk(15, 300)) {
        let values = Rsi::new(14).compute(&closes);
        for v in values.iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(v), "rsi {v} out of range");
        }
    }

    #[test]
    fn snapshot_momentum_within_bounds(closes in arb_walk(200, 320)) {
        let snap = IndicatorCalculator::default()
            .compute(&PriceSeries::from_closes(closes));
        prop_assert!(snap.is_some());
        if let Some(m) = snap.and_then(|s| s.momentum) {
            prop_assert!((0.0..=100.0).contains(&m));
        }
    }
}

// ── 2. EMA of a constant ─────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_of_constant_is_constant(
        level in 1.0..10_000.0_f64,
        period in 1usize..60,
        extra in 0usize..100,
    ) {
        let values = vec![level; period + extra];
        let ema = ema_of_series(&values, period);
        let last = ema[ema.len() - 1];
        prop_assert!((last - level).abs() <= level * 1e-12, "ema {last} vs {level}");
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn calculator_is_deterministic(closes in arb_walk(200, 260)) {
        let calc = IndicatorCalculator::default();
        let series = PriceSeries::from_closes(closes);
        let a = calc.compute(&series);
        let b = calc.compute(&series);
        prop_assert_eq!(a, b);
    }
}

// ── 4. Support locator ───────────────────────────────────────────────

proptest! {
    #[test]
    fn locator_only_picks_defined_levels_above_price(
        price in 1.0..500.0_f64,
        emas in arb_ema_map(),
    ) {
        let search = locate(price, &emas);
        match search.support {
            Some(level) => {
                let stored = emas.get(&level.period).copied().flatten();
                prop_assert_eq!(stored, Some(level.level));
                prop_assert!(level.level.is_finite());
                prop_assert!(price < level.level);
                prop_assert_eq!(level.distance_pct, search.min_distance_pct);

                // Nothing else qualifying is strictly closer.
                for (&period, ema) in &emas {
                    if let Some(v) = ema.filter(|v| v.is_finite() && *v != 0.0 && price < *v) {
                        let d = (price - v).abs() / v * 100.0;
                        prop_assert!(d >= level.distance_pct, "period {period} closer");
                    }
                }
            }
            None => {
                prop_assert!(search.min_distance_pct.is_infinite());
                for ema in emas.values() {
                    if let Some(v) = ema.filter(|v| v.is_finite() && *v != 0.0) {
                        prop_assert!(price >= v);
                    }
                }
            }
        }
    }

    #[test]
    fn locator_tie_goes_to_lowest_period(
        level in 10.0..500.0_f64,
        below_pct in 0.1..10.0_f64,
        low in 1usize..100,
        gap in 1usize..100,
    ) {
        let price = level * (1.0 - below_pct / 100.0);
        let emas = BTreeMap::from([(low + gap, Some(level)), (low, Some(level))]);
        let search = locate(price, &emas);
        prop_assert_eq!(search.support.map(|s| s.period), Some(low));
    }
}

// ── 5. Evaluator ─────────────────────────────────────────────────────

fn qualifying_snapshot(ema50: f64, below_pct: f64, momentum: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        current_close: ema50 * (1.0 - below_pct / 100.0),
        ema_by_period: BTreeMap::from([(50, Some(ema50)), (100, None), (200, None)]),
        momentum: Some(momentum),
        trend_main: Some(-1.0),
        trend_signal: Some(-1.5),
        trend_bullish: true,
        bar_count: 250,
    }
}

proptest! {
    #[test]
    fn all_four_conditions_emit(
        ema50 in 10.0..1000.0_f64,
        below in 0.01..2.9_f64,
        momentum in 0.0..49.9_f64,
    ) {
        let snap = qualifying_snapshot(ema50, below, momentum);
        let search = locate(snap.current_close, &snap.ema_by_period);
        let opp = OpportunityEvaluator::new(ScreenCriteria::default())
            .evaluate("X", &snap, &search);
        prop_assert!(opp.is_some());
    }

    #[test]
    fn three_of_four_never_emits(
        ema50 in 10.0..1000.0_f64,
        below in 0.01..2.9_f64,
        momentum in 0.0..49.9_f64,
        broken in 0usize..4,
        bad_momentum in 50.0..100.0_f64,
        far in 3.1..40.0_f64,
    ) {
        let mut snap = qualifying_snapshot(ema50, below, momentum);
        match broken {
            0 => snap.current_close = ema50 * 1.01,
            1 => snap.current_close = ema50 * (1.0 - far / 100.0),
            2 => snap.momentum = if far > 20.0 { None } else { Some(bad_momentum) },
            _ => snap.trend_bullish = false,
        }
        let search = locate(snap.current_close, &snap.ema_by_period);
        let opp = OpportunityEvaluator::new(ScreenCriteria::default())
            .evaluate("X", &snap, &search);
        prop_assert!(opp.is_none(), "condition {broken} broken but emitted");
    }
}

// ── 6. Sufficiency gate ──────────────────────────────────────────────

proptest! {
    #[test]
    fn short_series_yield_nothing(closes in arb_walk(0, 199)) {
        prop_assert!(IndicatorCalculator::default()
            .compute(&PriceSeries::from_closes(closes))
            .is_none());
    }
}
