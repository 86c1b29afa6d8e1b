//! End-to-end screen scenarios: close series → snapshot → support → opportunity.
//!
//! The hand-built snapshots pin each qualification condition in isolation; the
//! shaped price series exercise the full pipeline on real indicator output.

use std::collections::BTreeMap;

use swingscan_core::{
    locate, IndicatorCalculator, IndicatorParams, IndicatorSnapshot, OpportunityEvaluator,
    PriceSeries, Rating, Rejection, ScreenCriteria,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// 200-bar linear rise from 50 to `top`, a linear slide of `drop` over
/// `down` bars, then `bounce` bars each up `step`.
fn rise_slide_bounce(top: f64, down: usize, drop: f64, bounce: usize, step: f64) -> Vec<f64> {
    let up = 200;
    let mut closes: Vec<f64> = (0..up)
        .map(|i| 50.0 + (top - 50.0) * i as f64 / (up - 1) as f64)
        .collect();
    let low = top * (1.0 - drop);
    for k in 0..down {
        closes.push(top + (low - top) * (k + 1) as f64 / down as f64);
    }
    for _ in 0..bounce {
        let last = closes[closes.len() - 1];
        closes.push(last * (1.0 + step));
    }
    closes
}

fn snapshot_with(momentum: Option<f64>, bullish: bool) -> IndicatorSnapshot {
    IndicatorSnapshot {
        current_close: 98.0,
        ema_by_period: BTreeMap::from([(50, Some(100.0)), (100, Some(90.0)), (200, Some(80.0))]),
        momentum,
        trend_main: Some(0.25),
        trend_signal: Some(0.10),
        trend_bullish: bullish,
        bar_count: 260,
    }
}

fn screen(closes: Vec<f64>) -> Option<swingscan_core::Opportunity> {
    let calc = IndicatorCalculator::default();
    let snap = calc.compute(&PriceSeries::from_closes(closes))?;
    let search = locate(snap.current_close, &snap.ema_by_period);
    OpportunityEvaluator::new(ScreenCriteria::default()).evaluate("TEST.NS", &snap, &search)
}

// ── Scenario A: flat series ──────────────────────────────────────────

#[test]
fn flat_series_never_qualifies() {
    let calc = IndicatorCalculator::default();
    let snap = calc
        .compute(&PriceSeries::from_closes(vec![100.0; 210]))
        .expect("210 bars clears the gate");

    for period in [50, 100, 200] {
        let ema = snap.ema(period).expect("defined");
        assert!((ema - 100.0).abs() < 1e-9, "ema_{period} = {ema}");
    }
    assert_eq!(snap.momentum, Some(50.0));
    assert!(snap.trend_main.expect("defined").abs() < 1e-9);
    assert!(snap.trend_signal.expect("defined").abs() < 1e-9);
    assert!(!snap.trend_bullish);

    let search = locate(snap.current_close, &snap.ema_by_period);
    let evaluator = OpportunityEvaluator::new(ScreenCriteria::default());
    assert!(evaluator.evaluate("FLAT.NS", &snap, &search).is_none());
}

// ── Scenario B: qualifying snapshot ──────────────────────────────────

#[test]
fn two_percent_under_ema50_with_cross_qualifies() {
    let snap = snapshot_with(Some(35.0), true);
    let search = locate(snap.current_close, &snap.ema_by_period);
    let opp = OpportunityEvaluator::new(ScreenCriteria::default())
        .evaluate("RELIANCE.NS", &snap, &search)
        .expect("all four conditions hold");

    assert_eq!(opp.ticker(), "RELIANCE.NS");
    assert_eq!(opp.support().period, 50);
    assert!((opp.support().distance_pct - 2.0).abs() < 1e-9);
    assert_eq!(opp.momentum(), 35.0);
    assert_eq!(opp.current_close(), 98.0);
    assert_eq!(opp.trend().main(), 0.25);
    assert_eq!(opp.trend().signal(), 0.10);
    assert_eq!(opp.rating(1.5), Rating::Moderate);
}

// ── Scenario C: momentum too high ────────────────────────────────────

#[test]
fn high_momentum_blocks_an_otherwise_good_setup() {
    let snap = snapshot_with(Some(62.0), true);
    let search = locate(snap.current_close, &snap.ema_by_period);
    let evaluator = OpportunityEvaluator::new(ScreenCriteria::default());

    assert!(evaluator.evaluate("TCS.NS", &snap, &search).is_none());
    assert_eq!(
        evaluator.check("TCS.NS", &snap, &search).unwrap_err(),
        Rejection::MomentumTooHigh { momentum: 62.0 }
    );
}

// ── Three of four ────────────────────────────────────────────────────

#[test]
fn any_single_failed_condition_blocks_emission() {
    let evaluator = OpportunityEvaluator::new(ScreenCriteria::default());

    // 1. no support: price above every EMA
    let mut above = snapshot_with(Some(35.0), true);
    above.current_close = 120.0;
    let search = locate(above.current_close, &above.ema_by_period);
    assert_eq!(
        evaluator.check("A", &above, &search).unwrap_err(),
        Rejection::NoSupport
    );

    // 2. support too far: 5% under EMA50, every other EMA below price
    let mut far = snapshot_with(Some(35.0), true);
    far.current_close = 95.0;
    let search = locate(far.current_close, &far.ema_by_period);
    assert!(matches!(
        evaluator.check("B", &far, &search),
        Err(Rejection::SupportTooFar { .. })
    ));

    // 3. momentum undefined
    let snap = snapshot_with(None, true);
    let search = locate(snap.current_close, &snap.ema_by_period);
    assert_eq!(
        evaluator.check("C", &snap, &search).unwrap_err(),
        Rejection::MomentumUndefined
    );

    // 4. trend not bullish
    let snap = snapshot_with(Some(35.0), false);
    let search = locate(snap.current_close, &snap.ema_by_period);
    assert_eq!(
        evaluator.check("D", &snap, &search).unwrap_err(),
        Rejection::TrendNotBullish
    );
}

#[test]
fn distance_exactly_at_threshold_still_qualifies() {
    let mut snap = snapshot_with(Some(35.0), true);
    snap.current_close = 97.0;
    let search = locate(snap.current_close, &snap.ema_by_period);
    assert!((search.min_distance_pct - 3.0).abs() < 1e-12);
    assert!(OpportunityEvaluator::new(ScreenCriteria::default())
        .evaluate("EDGE", &snap, &search)
        .is_some());
}

#[test]
fn momentum_exactly_at_ceiling_is_rejected() {
    let snap = snapshot_with(Some(50.0), true);
    let search = locate(snap.current_close, &snap.ema_by_period);
    assert!(OpportunityEvaluator::new(ScreenCriteria::default())
        .evaluate("EDGE", &snap, &search)
        .is_none());
}

// ── Full pipeline on shaped series ───────────────────────────────────

#[test]
fn pullback_to_ema100_with_fresh_cross_is_a_strong_setup() {
    // Slide 20% over 22 weeks, then five 1% up-weeks: price ends ~1.2% under
    // EMA100 with RSI ~37 and MACD crossing its signal on the last bar.
    let closes = rise_slide_bounce(150.0, 22, 0.2, 5, 0.01);
    let opp = screen(closes.clone()).expect("setup qualifies");

    assert_eq!(opp.support().period, 100);
    assert!(opp.support().distance_pct < 1.5);
    assert!(opp.momentum() < 40.0);
    assert!(opp.trend().main() > opp.trend().signal());
    assert_eq!(opp.rating(1.5), Rating::Strong);

    // One bar earlier MACD was still under its signal.
    let calc = IndicatorCalculator::default();
    let prev = calc
        .compute(&PriceSeries::from_closes(closes[..closes.len() - 1].to_vec()))
        .expect("enough bars");
    assert!(prev.trend_main.expect("defined") < prev.trend_signal.expect("defined"));
}

#[test]
fn pullback_to_ema50_is_a_moderate_setup() {
    let closes = rise_slide_bounce(150.0, 24, 0.2, 4, 0.02);
    let opp = screen(closes).expect("setup qualifies");

    assert_eq!(opp.support().period, 50);
    assert!(opp.support().distance_pct > 1.5 && opp.support().distance_pct <= 3.0);
    assert!(opp.momentum() < 50.0);
    assert_eq!(opp.rating(1.5), Rating::Moderate);
}

#[test]
fn steady_uptrend_has_no_support_above_price() {
    let closes: Vec<f64> = (0..260).map(|i| 50.0 + i as f64 * 0.5).collect();
    let calc = IndicatorCalculator::default();
    let snap = calc.compute(&PriceSeries::from_closes(closes)).expect("enough bars");
    let search = locate(snap.current_close, &snap.ema_by_period);
    assert!(search.support.is_none());
    assert!(search.min_distance_pct.is_infinite());
}

// ── Data sufficiency ─────────────────────────────────────────────────

#[test]
fn short_history_is_undefined_not_an_error() {
    let calc = IndicatorCalculator::default();
    assert!(calc
        .compute(&PriceSeries::from_closes(vec![100.0; 199]))
        .is_none());
    assert!(calc
        .compute(&PriceSeries::from_closes(vec![100.0; 200]))
        .is_some());
}

#[test]
fn non_finite_closes_do_not_count_toward_the_gate() {
    let mut closes = vec![100.0; 200];
    closes[10] = f64::NAN;
    closes[20] = f64::INFINITY;
    let calc = IndicatorCalculator::default();
    assert!(calc.compute(&PriceSeries::from_closes(closes.clone())).is_none());

    closes.extend([100.0, 100.0]);
    let snap = calc
        .compute(&PriceSeries::from_closes(closes))
        .expect("200 finite closes");
    assert_eq!(snap.bar_count, 200);
    assert_eq!(snap.current_close, 100.0);
}

#[test]
fn lowered_gate_leaves_long_emas_undefined() {
    let params = IndicatorParams {
        min_bars: 120,
        ..IndicatorParams::default()
    };
    let calc = IndicatorCalculator::new(params);
    let closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
    let snap = calc.compute(&PriceSeries::from_closes(closes)).expect("gate is 120");

    assert!(snap.ema(50).is_some());
    assert!(snap.ema(100).is_some());
    assert_eq!(snap.ema(200), None);
    assert_eq!(snap.ema_by_period.get(&200), Some(&None));
}

// ── Look-ahead ───────────────────────────────────────────────────────

#[test]
fn snapshot_depends_only_on_the_prefix() {
    let full = rise_slide_bounce(150.0, 22, 0.2, 5, 0.01);
    let calc = IndicatorCalculator::default();
    let series = PriceSeries::from_closes(full.clone());

    for cut in [200, 210, 222, full.len()] {
        let via_prefix = calc.compute(&series.prefix(cut));
        let direct = calc.compute(&PriceSeries::from_closes(full[..cut].to_vec()));
        assert_eq!(via_prefix, direct, "cut at {cut}");
    }
}

#[test]
fn appending_a_bar_never_changes_the_earlier_snapshot() {
    let full = rise_slide_bounce(200.0, 15, 0.15, 3, 0.02);
    let calc = IndicatorCalculator::default();
    let before = calc.compute(&PriceSeries::from_closes(full[..210].to_vec()));
    let _ = calc.compute(&PriceSeries::from_closes(full.clone()));
    let again = calc.compute(&PriceSeries::from_closes(full[..210].to_vec()));
    assert_eq!(before, again);
}
