//! Artifact export — JSON and CSV written alongside the rendered reports.
//!
//! Each scan gets its own directory under the configured output dir:
//! - `scan.json` — the full [`ScanSummary`], every ticker and its snapshot
//! - `opportunities.csv` — one row per qualifying ticker
//! - `report.html` / `report.md` — the rendered reports

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Report;
use crate::batch::ScanSummary;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_scan_json(summary: &ScanSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize ScanSummary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: ticker, rating, close, support_period, support_level,
/// distance_pct, rsi, macd, macd_signal
pub fn export_opportunities_csv(summary: &ScanSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "rating",
        "close",
        "support_period",
        "support_level",
        "distance_pct",
        "rsi",
        "macd",
        "macd_signal",
    ])?;

    for opp in summary.opportunities() {
        let support = opp.support();
        wtr.write_record([
            &opp.ticker().to_string(),
            &super::rating_of(opp, &summary.criteria).to_string(),
            &format!("{:.4}", opp.current_close()),
            &support.period.to_string(),
            &format!("{:.4}", support.level),
            &format!("{:.4}", support.distance_pct),
            &format!("{:.4}", opp.momentum()),
            &format!("{:.6}", opp.trend().main()),
            &format!("{:.6}", opp.trend().signal()),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ─── Artifact directory ─────────────────────────────────────────────

/// Write every artifact for one scan. Returns the created directory.
pub fn save_artifacts(summary: &ScanSummary, report: &Report, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        slug(&summary.universe),
        summary.started_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_scan_json(summary)?;
    write(&run_dir.join("scan.json"), &json)?;

    let csv = export_opportunities_csv(summary)?;
    write(&run_dir.join("opportunities.csv"), &csv)?;

    write(&run_dir.join("report.html"), &report.html)?;
    write(&run_dir.join("report.md"), &report.markdown)?;

    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Lowercase ASCII alphanumerics, everything else collapsed to `-`.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "scan".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportSettings;
    use crate::reporting::fixtures;

    #[test]
    fn csv_has_header_and_one_row_per_opportunity() {
        let csv = export_opportunities_csv(&fixtures::summary(true)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ticker,rating,close,support_period"));
        assert!(lines[1].starts_with("M&M.NS,Strong Buy,99.0000,50,100.0000,1.0000,35.0000"));
        assert!(lines[2].starts_with("TCS.NS,Buy,"));
    }

    #[test]
    fn csv_of_empty_scan_is_header_only() {
        let csv = export_opportunities_csv(&fixtures::summary(false)).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn json_carries_outcomes_in_order() {
        let json = export_scan_json(&fixtures::summary(true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let results = value["results"].as_array().unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0]["ticker"], "M&M.NS");
        assert_eq!(results[0]["outcome"]["status"], "qualified");
        assert_eq!(results[0]["outcome"]["opportunity"]["support"]["period"], 50);
        assert_eq!(results[1]["outcome"]["status"], "screened_out");
        assert_eq!(results[1]["outcome"]["rejection"]["reason"], "trend_not_bullish");
        assert_eq!(results[2]["outcome"]["status"], "insufficient_data");
        assert_eq!(results[3]["outcome"]["status"], "fetch_failed");
    }

    #[test]
    fn slug_is_filesystem_safe() {
        assert_eq!(slug("NIFTY 50"), "nifty-50");
        assert_eq!(slug("  Banks & NBFCs! "), "banks-nbfcs");
        assert_eq!(slug("***"), "scan");
    }

    proptest::proptest! {
        #[test]
        fn slug_is_always_a_safe_dirname(name in ".{0,40}") {
            let s = slug(&name);
            proptest::prop_assert!(!s.is_empty());
            proptest::prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            proptest::prop_assert!(!s.starts_with('-') && !s.ends_with('-'));
            proptest::prop_assert!(!s.contains("--"));
        }
    }

    #[test]
    fn save_artifacts_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let summary = fixtures::summary(true);
        let report = Report::build(&summary, &ReportSettings::default());

        let run_dir = save_artifacts(&summary, &report, dir.path()).unwrap();
        assert!(run_dir.ends_with("nifty-50_20261012_063000"));
        for name in ["scan.json", "opportunities.csv", "report.html", "report.md"] {
            assert!(run_dir.join(name).is_file(), "{name} missing");
        }
        let html = std::fs::read_to_string(run_dir.join("report.html")).unwrap();
        assert_eq!(html, report.html);
    }
}
