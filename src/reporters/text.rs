//! Text (terminal) reporter with colors and formatting

use crate::models::{RunReport, TriggerReason, Verdict};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const LIGHT_RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";

/// Documents listed in the score table
const MAX_TABLE_ROWS: usize = 20;

/// Reason colors
fn reason_color(reason: &TriggerReason) -> &'static str {
    if reason.is_critical() {
        RED
    } else if reason.is_semantic() {
        YELLOW
    } else {
        LIGHT_RED
    }
}

/// Render report as formatted terminal output
pub fn render(report: &RunReport) -> Result<String> {
    let mut out = String::new();
    let s = &report.summary;

    // Header
    out.push_str(&format!("\n{BOLD}Rule Complexity Check{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Documents: {}  Triggered: {}  Skipped: {}  Multiplier: {:.1}\n",
        s.documents_analyzed, s.documents_triggered, s.documents_failed, report.threshold_multiplier
    ));
    out.push_str(&format!(
        "Total: {:.1}  Average: {:.1}  Size: {:.1} KB  Lines: {}\n\n",
        s.total_complexity, s.average_complexity, s.total_size_kb, s.total_lines
    ));

    // Score table
    if !report.verdicts.is_empty() {
        out.push_str(&format!(
            "{DIM}  DOCUMENT                                   SCORE  BASELINE  SEM{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));
        for verdict in report.verdicts.iter().take(MAX_TABLE_ROWS) {
            out.push_str(&format_row(verdict));
        }
        let remaining = report.verdicts.len().saturating_sub(MAX_TABLE_ROWS);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --format json for the full record){RESET}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    // Triggered detail
    let triggered: Vec<&Verdict> = report.triggered().collect();
    if triggered.is_empty() {
        out.push_str(&format!(
            "{GREEN}{BOLD}No issues.{RESET} All documents are within complexity thresholds.\n"
        ));
    } else {
        out.push_str(&format!("{BOLD}TRIGGERED{RESET} ({})\n", triggered.len()));
        for verdict in triggered {
            out.push_str(&format!("  {BOLD}{}{RESET}\n", verdict.document));
            for reason in &verdict.reasons {
                let c = reason_color(reason);
                out.push_str(&format!("    {c}- {}{RESET}\n", reason));
                if let TriggerReason::Conflicts { labels, .. }
                | TriggerReason::Violations { labels, .. } = reason
                {
                    for label in labels {
                        out.push_str(&format!("      {DIM}{}{RESET}\n", label));
                    }
                }
            }
        }
    }

    if !report.failures.is_empty() || !report.semantic_failures.is_empty() {
        out.push('\n');
        for failure in &report.failures {
            out.push_str(&format!(
                "{YELLOW}skipped{RESET} {}: {DIM}{}{RESET}\n",
                failure.document, failure.error
            ));
        }
        for failure in &report.semantic_failures {
            out.push_str(&format!(
                "{DIM}no rating{RESET} {}: {DIM}{}{RESET}\n",
                failure.document, failure.error
            ));
        }
    }

    if !report.recommendations.is_empty() {
        out.push_str(&format!("\n{BOLD}RECOMMENDATIONS{RESET}\n"));
        for rec in &report.recommendations {
            out.push_str(&format!("  {DIM}•{RESET} {}\n", rec));
        }
    }

    Ok(out)
}

fn format_row(verdict: &Verdict) -> String {
    // Truncate on chars to stay on a UTF-8 boundary
    let name = if verdict.document.chars().count() > 40 {
        let skip = verdict.document.chars().count() - 37;
        format!("...{}", verdict.document.chars().skip(skip).collect::<String>())
    } else {
        verdict.document.clone()
    };
    let baseline = verdict
        .baseline
        .map_or_else(|| "-".to_string(), |b| format!("{:.1}", b));
    let semantic = verdict
        .semantic
        .as_ref()
        .and_then(|r| r.complexity)
        .map_or_else(|| "-".to_string(), |c| format!("{}/10", c));
    let color = if verdict.triggered { LIGHT_RED } else { GREEN };

    format!(
        "  {color}{:<40}{RESET} {:>7.1}  {:>8}  {}\n",
        name, verdict.static_score.total, baseline, semantic
    )
}
