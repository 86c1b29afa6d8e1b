//! HTML email report.
//!
//! Self-contained document with inline CSS so it renders the same in mail
//! clients that strip external stylesheets.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use swingscan_core::{Opportunity, Rating, ScreenCriteria};

use super::{criteria_line, rating_of, rationale};
use crate::batch::ScanSummary;
use crate::config::ReportSettings;

const STYLE: &str = r#"
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f5f8fa; color: #333; line-height: 1.6; padding: 20px; }
    .container { max-width: 1000px; margin: 0 auto; background: white; border-radius: 10px; overflow: hidden; box-shadow: 0 0 20px rgba(0,0,0,0.1); }
    .header { background: linear-gradient(135deg, #1a2a6c, #b21f1f, #1a2a6c); color: white; text-align: center; padding: 25px; border-radius: 10px 10px 0 0; }
    .header h1 { margin: 0; font-size: 24px; }
    .header p { margin: 10px 0 0; opacity: 0.9; }
    .card { background: white; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.05); margin: 20px; overflow: hidden; border-left: 4px solid #4CAF50; }
    .card-header { background-color: #f9f9f9; padding: 15px 20px; border-bottom: 1px solid #eee; display: flex; justify-content: space-between; align-items: center; }
    .stock-name { font-weight: bold; font-size: 18px; color: #1a237e; }
    .stock-rating { color: white; padding: 5px 10px; border-radius: 20px; font-size: 14px; }
    .rating-strong { background-color: #4CAF50; }
    .rating-good { background-color: #2196F3; }
    .card-body { padding: 20px; }
    .data-row { display: flex; margin-bottom: 15px; flex-wrap: wrap; }
    .data-item { flex: 1; min-width: 200px; margin-bottom: 10px; }
    .data-label { font-weight: 600; color: #666; font-size: 14px; margin-bottom: 5px; }
    .data-value { font-size: 16px; font-weight: 600; }
    .support-distance { display: inline-block; padding: 3px 8px; border-radius: 4px; background-color: #e8f5e9; color: #2e7d32; font-weight: bold; }
    .rsi-value { color: #c62828; font-weight: bold; }
    .macd-bullish { color: #388e3c; font-weight: bold; }
    .reasoning { background-color: #f1f8e9; padding: 15px; border-radius: 8px; margin-top: 15px; font-size: 14px; }
    .skipped { margin: 20px; font-size: 13px; color: #555; }
    .skipped table { border-collapse: collapse; width: 100%; }
    .skipped td, .skipped th { border-bottom: 1px solid #eee; padding: 4px 8px; text-align: left; }
    .footer { text-align: center; padding: 20px; color: #777; font-size: 12px; border-top: 1px solid #eee; }
    .no-signals { text-align: center; padding: 40px; color: #777; }
"#;

const DISCLAIMER: &str = "This is automated technical analysis. Fundamental factors and market \
conditions should also be considered. Past performance is not indicative of future results.";

pub struct HtmlReportGenerator<'a> {
    settings: &'a ReportSettings,
}

impl<'a> HtmlReportGenerator<'a> {
    pub fn new(settings: &'a ReportSettings) -> Self {
        Self { settings }
    }

    pub fn generate(&self, summary: &ScanSummary, generated_at: DateTime<Utc>) -> String {
        let title = format!("{} Swing Trade Opportunities", escape(&summary.universe));
        let mut html = String::with_capacity(16 * 1024);

        // `write!` into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n\
             <div class=\"header\">\n<h1>{title}</h1>\n\
             <p>Stocks near key support levels with bullish indicators</p>\n\
             <p>{}</p>\n</div>\n",
            summary.started_at.format("%A, %d %B %Y"),
        );

        let opportunities = summary.opportunities();
        if opportunities.is_empty() {
            html.push_str(
                "<div class=\"no-signals\">\n\
                 <h3>No Swing Trade Opportunities Found This Week</h3>\n\
                 <p>No stocks currently meet the criteria for swing trading opportunities.</p>\n\
                 <p>Check back next week for updated signals.</p>\n</div>\n",
            );
        } else {
            for opp in opportunities {
                self.card(&mut html, opp, &summary.criteria);
            }
        }

        self.skipped_table(&mut html, summary);

        let _ = write!(
            html,
            "<div class=\"footer\">\n\
             <p><strong>Analysis Criteria:</strong> {}</p>\n\
             <p><strong>Disclaimer:</strong> {DISCLAIMER}</p>\n\
             <p>Generated on {} &middot; {} tickers screened &middot; config {}</p>\n\
             </div>\n</div>\n</body>\n</html>\n",
            escape(&criteria_line(summary)),
            generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            summary.screened_count(),
            &summary.config_fingerprint[..summary.config_fingerprint.len().min(12)],
        );
        html
    }

    fn card(&self, html: &mut String, opp: &Opportunity, criteria: &ScreenCriteria) {
        let rating = rating_of(opp, criteria);
        let badge_class = match rating {
            Rating::Strong => "rating-strong",
            Rating::Moderate => "rating-good",
        };
        let badge = rating.to_string();
        let currency = escape(&self.settings.currency);
        let support = opp.support();

        let _ = write!(
            html,
            "<div class=\"card\">\n\
             <div class=\"card-header\">\n\
             <div class=\"stock-name\">{ticker}</div>\n\
             <div class=\"stock-rating {badge_class}\">{badge}</div>\n\
             </div>\n\
             <div class=\"card-body\">\n\
             <div class=\"data-row\">\n\
             <div class=\"data-item\"><div class=\"data-label\">Current Price</div>\
             <div class=\"data-value\">{currency}{close:.2}</div></div>\n\
             <div class=\"data-item\"><div class=\"data-label\">Nearest Support</div>\
             <div class=\"data-value\">{period}-week EMA: {currency}{level:.2} \
             <span class=\"support-distance\">({distance:.2}% away)</span></div></div>\n\
             <div class=\"data-item\"><div class=\"data-label\">RSI (14-week)</div>\
             <div class=\"data-value rsi-value\">{rsi:.2}</div></div>\n\
             </div>\n\
             <div class=\"data-row\">\n\
             <div class=\"data-item\"><div class=\"data-label\">MACD</div>\
             <div class=\"data-value\">{main:.4}</div></div>\n\
             <div class=\"data-item\"><div class=\"data-label\">Signal Line</div>\
             <div class=\"data-value\">{signal:.4}</div></div>\n\
             <div class=\"data-item\"><div class=\"data-label\">MACD Signal</div>\
             <div class=\"data-value macd-bullish\">Bullish</div></div>\n\
             </div>\n\
             <div class=\"reasoning\"><strong>Trading Rationale:</strong> {why}</div>\n\
             </div>\n</div>\n",
            ticker = escape(opp.ticker()),
            close = opp.current_close(),
            period = support.period,
            level = support.level,
            distance = support.distance_pct,
            rsi = opp.momentum(),
            main = opp.trend().main(),
            signal = opp.trend().signal(),
            why = escape(&rationale(opp, criteria)),
        );
    }

    fn skipped_table(&self, html: &mut String, summary: &ScanSummary) {
        let skipped = summary.skipped();
        if skipped.is_empty() {
            return;
        }
        let _ = write!(
            html,
            "<div class=\"skipped\">\n<p><strong>{} tickers skipped</strong></p>\n\
             <table>\n<tr><th>Ticker</th><th>Status</th><th>Detail</th></tr>\n",
            skipped.len()
        );
        for r in skipped {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&r.ticker),
                r.outcome.label(),
                escape(&r.outcome.detail()),
            );
        }
        html.push_str("</table>\n</div>\n");
    }
}

/// Minimal HTML text escaping (`M&M.NS` is a real NSE ticker).
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
