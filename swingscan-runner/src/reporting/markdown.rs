//! Markdown report generator.

use swingscan_core::Opportunity;

use super::{criteria_line, rating_of, rationale};
use crate::batch::ScanSummary;
use crate::config::ReportSettings;

pub struct MarkdownReportGenerator<'a> {
    settings: &'a ReportSettings,
}

impl<'a> MarkdownReportGenerator<'a> {
    pub fn new(settings: &'a ReportSettings) -> Self {
        Self { settings }
    }

    pub fn generate(&self, summary: &ScanSummary) -> String {
        let mut md = String::with_capacity(4096);
        let cur = &self.settings.currency;

        md.push_str(&format!("# {} Swing Trade Opportunities\n\n", summary.universe));
        md.push_str(&format!(
            "Scan of {} · source `{}` · config `{}`\n\n",
            summary.started_at.format("%Y-%m-%d %H:%M UTC"),
            summary.source,
            &summary.config_fingerprint[..summary.config_fingerprint.len().min(12)],
        ));

        let opportunities = summary.opportunities();
        if opportunities.is_empty() {
            md.push_str("_No swing trade opportunities found this week._\n\n");
        } else {
            md.push_str("| Ticker | Rating | Price | Support | Distance | RSI | MACD | Signal |\n");
            md.push_str("|--------|--------|-------|---------|----------|-----|------|--------|\n");
            for opp in &opportunities {
                md.push_str(&self.row(opp, summary));
            }
            md.push('\n');

            md.push_str("## Rationale\n\n");
            for opp in &opportunities {
                md.push_str(&format!(
                    "- **{}**: {}\n",
                    opp.ticker(),
                    rationale(opp, &summary.criteria)
                ));
            }
            md.push('\n');
        }

        let skipped = summary.skipped();
        if !skipped.is_empty() {
            md.push_str(&format!("## Skipped ({})\n\n", skipped.len()));
            md.push_str("| Ticker | Status | Detail |\n");
            md.push_str("|--------|--------|--------|\n");
            for r in skipped {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    cell(&r.ticker),
                    r.outcome.label(),
                    cell(&r.outcome.detail())
                ));
            }
            md.push('\n');
        }

        md.push_str(&format!(
            "---\n**Criteria:** {}. Prices in {cur}.\n",
            criteria_line(summary)
        ));
        md
    }

    fn row(&self, opp: &Opportunity, summary: &ScanSummary) -> String {
        let support = opp.support();
        format!(
            "| {} | {} | {:.2} | EMA{} @ {:.2} | {:.2}% | {:.2} | {:.4} | {:.4} |\n",
            cell(opp.ticker()),
            rating_of(opp, &summary.criteria),
            opp.current_close(),
            support.period,
            support.level,
            support.distance_pct,
            opp.momentum(),
            opp.trend().main(),
            opp.trend().signal(),
        )
    }
}

/// Table cell text with pipes escaped.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
