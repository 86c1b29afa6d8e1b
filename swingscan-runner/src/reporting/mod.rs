//! Report rendering and artifact export.
//!
//! - `html`: the email body (one card per opportunity)
//! - `markdown`: the same content for terminals and chat
//! - `export`: CSV/JSON artifacts written next to the rendered reports

pub mod export;
pub mod html;
pub mod markdown;

pub use export::{export_opportunities_csv, export_scan_json, save_artifacts};
pub use html::HtmlReportGenerator;
pub use markdown::MarkdownReportGenerator;

use chrono::{DateTime, Utc};
use swingscan_core::{Opportunity, Rating, ScreenCriteria};

use crate::batch::ScanSummary;
use crate::config::ReportSettings;

/// A rendered report ready for delivery.
#[derive(Debug, Clone)]
pub struct Report {
    pub subject: String,
    pub html: String,
    pub markdown: String,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn build(summary: &ScanSummary, settings: &ReportSettings) -> Self {
        let generated_at = Utc::now();
        Self {
            subject: subject_line(summary),
            html: HtmlReportGenerator::new(settings).generate(summary, generated_at),
            markdown: MarkdownReportGenerator::new(settings).generate(summary),
            generated_at,
        }
    }
}

pub fn subject_line(summary: &ScanSummary) -> String {
    match summary.opportunities().len() {
        0 => format!("{} Swing Trade Report: No Opportunities Found", summary.universe),
        n => format!(
            "{} Swing Trade Opportunities: {n} Stocks Found",
            summary.universe
        ),
    }
}

/// Rating of `opp` under the scan's strong threshold.
pub(crate) fn rating_of(opp: &Opportunity, criteria: &ScreenCriteria) -> Rating {
    opp.rating(criteria.strong_below_pct)
}

/// Plain-text rationale paragraph for one opportunity.
pub(crate) fn rationale(opp: &Opportunity, criteria: &ScreenCriteria) -> String {
    let momentum = if opp.momentum() < criteria.oversold_below {
        "indicates oversold conditions"
    } else {
        "sits in neutral territory"
    };
    format!(
        "{} is trading near its {}-week EMA support level ({:.2}% below). \
         The weekly RSI of {:.2} {momentum}, and the MACD shows a bullish signal. \
         This suggests a potential buying opportunity for swing traders targeting \
         a rebound to recent resistance levels.",
        opp.ticker(),
        opp.support().period,
        opp.support().distance_pct,
        opp.momentum(),
    )
}

/// One-sentence description of the active criteria, used in report footers.
pub(crate) fn criteria_line(summary: &ScanSummary) -> String {
    let periods = summary
        .indicators
        .ema_periods
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Stocks trading within {}% of key weekly EMAs ({periods}) with RSI < {} and bullish MACD crossover",
        summary.criteria.max_support_distance_pct, summary.criteria.momentum_ceiling
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_counts_opportunities() {
        assert_eq!(
            subject_line(&fixtures::summary(true)),
            "NIFTY 50 Swing Trade Opportunities: 2 Stocks Found"
        );
        assert_eq!(
            subject_line(&fixtures::summary(false)),
            "NIFTY 50 Swing Trade Report: No Opportunities Found"
        );
    }

    #[test]
    fn rating_follows_strong_threshold() {
        let summary = fixtures::summary(true);
        let opps = summary.opportunities();
        // 1% under support vs 2.5% under support
        assert_eq!(rating_of(opps[0], &summary.criteria), Rating::Strong);
        assert_eq!(rating_of(opps[1], &summary.criteria), Rating::Moderate);
    }

    #[test]
    fn rationale_distinguishes_oversold() {
        let summary = fixtures::summary(true);
        let opps = summary.opportunities();
        let oversold = rationale(opps[0], &summary.criteria);
        assert!(oversold.contains("50-week EMA support level (1.00% below)"));
        assert!(oversold.contains("RSI of 35.00 indicates oversold"));
        let neutral = rationale(opps[1], &summary.criteria);
        assert!(neutral.contains("RSI of 45.00 sits in neutral territory"));
    }

    #[test]
    fn criteria_line_lists_configured_periods() {
        assert_eq!(
            criteria_line(&fixtures::summary(false)),
            "Stocks trading within 3% of key weekly EMAs (50, 100, 200) with RSI < 50 and bullish MACD crossover"
        );
    }

    #[test]
    fn report_bundles_subject_and_bodies() {
        let report = Report::build(&fixtures::summary(false), &ReportSettings::default());
        assert!(report.subject.contains("No Opportunities"));
        assert!(report.html.contains("No Swing Trade Opportunities Found This Week"));
        assert!(report.markdown.contains("No swing trade opportunities found"));
    }
}
