//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Two documents:
//! - the condensed run summary, suitable for a pull request comment
//! - the alert, listing every triggered document with its reasons

use crate::models::{RunReport, TriggerReason, Verdict};
use crate::reporters::artifacts::{ALERT_JSON_FILE, RESULTS_FILE};
use anyhow::Result;

/// Recommendations shown in the summary
const MAX_SUMMARY_RECOMMENDATIONS: usize = 5;
/// Recommendations shown in the alert
const MAX_ALERT_RECOMMENDATIONS: usize = 10;

/// Render the condensed summary
pub fn render(report: &RunReport) -> Result<String> {
    let mut md = String::new();

    md.push_str("## Rule Complexity Summary\n\n");
    md.push_str(&render_static_stats(report));
    md.push('\n');

    if report.summary.semantic_ratings > 0 || !report.semantic_failures.is_empty() {
        md.push_str(&render_semantic_stats(report));
        md.push('\n');
    }

    md.push_str(&render_threshold_check(report));
    md.push('\n');

    if !report.failures.is_empty() {
        md.push_str("### Skipped Documents\n\n");
        for failure in &report.failures {
            md.push_str(&format!("- `{}`: {}\n", failure.document, failure.error));
        }
        md.push('\n');
    }

    if !report.recommendations.is_empty() {
        md.push_str("### Recommendations\n\n");
        for rec in report.recommendations.iter().take(MAX_SUMMARY_RECOMMENDATIONS) {
            md.push_str(&format!("- {}\n", rec));
        }
        md.push('\n');
    }

    md.push_str(&render_footer(report));
    Ok(md)
}

/// Render the alert for triggered documents
pub fn render_alert(report: &RunReport) -> Result<String> {
    let triggered: Vec<&Verdict> = report.triggered().collect();
    let mut md = String::new();

    if triggered.is_empty() {
        md.push_str("# Rule Complexity Alert\n\n");
        md.push_str("No issues: no document triggered a complexity rule.\n");
        return Ok(md);
    }

    md.push_str("# Complexity Threshold Exceeded\n\n");
    md.push_str(&format!(
        "{} of {} documents triggered at least one rule.\n\n",
        triggered.len(),
        report.verdicts.len()
    ));

    for verdict in &triggered {
        md.push_str(&render_alert_entry(verdict));
    }

    if !report.recommendations.is_empty() {
        md.push_str("## Immediate Actions Required\n\n");
        for rec in report.recommendations.iter().take(MAX_ALERT_RECOMMENDATIONS) {
            md.push_str(&format!("- {}\n", rec));
        }
        md.push('\n');
    }

    md.push_str("## Next Steps\n\n");
    md.push_str("1. **Review the detailed report** in the run artifacts\n");
    md.push_str("2. **Simplify complex files** by splitting them into smaller modules\n");
    md.push_str("3. **Resolve rule conflicts** by consolidating similar rules\n");
    md.push_str("4. **Fix best practice violations** in code examples\n");
    md.push_str("5. **Improve tooling compatibility** by simplifying complex workflows\n\n");

    md.push_str("## Reports Available\n\n");
    md.push_str(&format!("- `{}` - full record of every document\n", RESULTS_FILE));
    md.push_str(&format!("- `{}` - triggered documents only\n", ALERT_JSON_FILE));

    Ok(md)
}

fn render_static_stats(report: &RunReport) -> String {
    let s = &report.summary;
    let mut out = String::from("### Static Analysis\n\n");
    out.push_str(&format!("- **Documents analyzed:** {}\n", s.documents_analyzed));
    if s.documents_failed > 0 {
        out.push_str(&format!("- **Documents skipped:** {}\n", s.documents_failed));
    }
    out.push_str(&format!("- **Total complexity:** {:.1}\n", s.total_complexity));
    out.push_str(&format!("- **Average complexity:** {:.1}\n", s.average_complexity));
    out.push_str(&format!(
        "- **Total size:** {:.1} KB ({} lines)\n",
        s.total_size_kb, s.total_lines
    ));
    if s.total_baseline > 0.0 {
        out.push_str(&format!(
            "- **Baselined documents:** {:.1} now vs {:.1} baseline\n",
            s.total_current, s.total_baseline
        ));
    }
    if !s.high_complexity.is_empty() {
        out.push_str(&format!(
            "- **High complexity documents:** {}\n",
            s.high_complexity.len()
        ));
        for doc in s.high_complexity.iter().take(3) {
            let total = report
                .verdicts
                .iter()
                .find(|v| &v.document == doc)
                .map_or(0.0, |v| v.static_score.total);
            out.push_str(&format!("  - `{}`: {:.1}\n", doc, total));
        }
    }
    if s.documents_with_conflicts > 0 {
        out.push_str(&format!(
            "- **Documents with rule conflicts:** {}\n",
            s.documents_with_conflicts
        ));
    }
    if s.documents_with_violations > 0 {
        out.push_str(&format!(
            "- **Documents with best practice violations:** {}\n",
            s.documents_with_violations
        ));
    }
    out
}

fn render_semantic_stats(report: &RunReport) -> String {
    let mut out = String::from("### Semantic Analysis\n\n");
    out.push_str(&format!(
        "- **Documents rated:** {}\n",
        report.summary.semantic_ratings
    ));
    if !report.semantic_failures.is_empty() {
        out.push_str(&format!(
            "- **Ratings unavailable:** {}\n",
            report.semantic_failures.len()
        ));
    }
    let issues: usize = report
        .verdicts
        .iter()
        .filter_map(|v| v.semantic.as_ref())
        .map(|r| r.issues.len())
        .sum();
    if issues > 0 {
        out.push_str(&format!("- **Compatibility issues:** {}\n", issues));
    }
    out
}

fn render_threshold_check(report: &RunReport) -> String {
    let mut out = String::from("### Threshold Check\n\n");

    if report.verdicts.is_empty() {
        out.push_str("**Status: NO ISSUES.** No documents were analyzed.\n");
        return out;
    }

    let triggered: Vec<&Verdict> = report.triggered().collect();
    if triggered.is_empty() {
        out.push_str(&format!(
            "**Status: NO ISSUES.** All {} documents are within complexity thresholds (multiplier {:.1}).\n",
            report.verdicts.len(),
            report.threshold_multiplier
        ));
        return out;
    }

    out.push_str(&format!(
        "**Status: THRESHOLD EXCEEDED.** {} of {} documents triggered.\n\n",
        triggered.len(),
        report.verdicts.len()
    ));
    out.push_str("| Document | Rules | Baseline | Score |\n");
    out.push_str("|----------|-------|----------|-------|\n");
    for verdict in triggered {
        let rules: Vec<&str> = verdict.reasons.iter().map(|r| r.rule()).collect();
        let baseline = verdict
            .baseline
            .map_or_else(|| "-".to_string(), |b| format!("{:.1}", b));
        out.push_str(&format!(
            "| `{}` | {} | {} | {:.1} |\n",
            verdict.document,
            rules.join(", "),
            baseline,
            verdict.static_score.total
        ));
    }
    out
}

fn render_alert_entry(verdict: &Verdict) -> String {
    let mut out = format!("### `{}`\n\n", verdict.document);

    for reason in &verdict.reasons {
        match reason {
            TriggerReason::StaticRegression {
                current,
                baseline,
                threshold,
                excess_percentage,
            } => {
                let level = if reason.is_critical() { "CRITICAL" } else { "WARNING" };
                out.push_str(&format!("- **Static regression ({})**\n", level));
                out.push_str(&format!("  - Current: {:.1}\n", current));
                out.push_str(&format!("  - Baseline: {:.1}\n", baseline));
                out.push_str(&format!("  - Threshold: {:.1}\n", threshold));
                out.push_str(&format!("  - **Excess: {:.1}%**\n", excess_percentage));
            }
            TriggerReason::SemanticComplexity { rating, limit } => {
                out.push_str(&format!(
                    "- **High semantic complexity:** {}/10 (limit {})\n",
                    rating, limit
                ));
            }
            TriggerReason::Compatibility { rating, floor } => {
                out.push_str(&format!(
                    "- **Low tooling compatibility:** {}/10 (floor {})\n",
                    rating, floor
                ));
            }
            TriggerReason::Conflicts { labels, .. } => {
                out.push_str("- **Rule conflicts**\n");
                for label in labels {
                    out.push_str(&format!("  - {}\n", label));
                }
            }
            TriggerReason::Violations { labels, .. } => {
                out.push_str("- **Best practice violations**\n");
                for label in labels {
                    out.push_str(&format!("  - {}\n", label));
                }
            }
        }
    }

    if let Some(rating) = &verdict.semantic {
        if !rating.issues.is_empty() {
            out.push_str("- **Compatibility issues**\n");
            for issue in &rating.issues {
                out.push_str(&format!("  - {}\n", issue));
            }
        }
    }

    out.push('\n');
    out
}

fn render_footer(report: &RunReport) -> String {
    format!(
        "---\n\n*Generated by rulegauge on {}*\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    )
}
