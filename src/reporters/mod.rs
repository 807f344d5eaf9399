//! Output reporters for rulegauge run results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (the full record)
//! - `markdown` - GitHub-flavored Markdown summary for PR comments
//!
//! Every format also has an alert variant restricted to triggered verdicts.

mod artifacts;
mod json;
mod markdown;
mod text;

pub use artifacts::{
    write_artifacts, ALERT_JSON_FILE, ALERT_MARKDOWN_FILE, RESULTS_FILE, SUMMARY_FILE,
};

use crate::models::RunReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a run report using an OutputFormat enum
pub fn report_with_format(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}

/// Render only the triggered verdicts
pub fn alert_with_format(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(&report.alert_subset()),
        OutputFormat::Json => json::render_alert(report),
        OutputFormat::Markdown => markdown::render_alert(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        FindingKind, RunSummary, SemanticRating, StaticScore, StructuralFinding, TriggerReason,
        Verdict,
    };
    use chrono::Local;

    fn score(document: &str, total: f64, conflicts: Vec<String>) -> StaticScore {
        StaticScore::new(
            document,
            vec![StructuralFinding {
                kind: FindingKind::Conditional,
                count: 1,
                weight: total,
                contribution: total,
            }],
            conflicts,
            vec![],
            40,
            2.5,
        )
    }

    /// A run with one triggered and one clean document
    pub(crate) fn test_report() -> RunReport {
        let conflict = "Blocking rule detected: 2 instances".to_string();
        let hot = Verdict::new(
            score("rules/hot.mdc", 130.0, vec![conflict.clone()]),
            Some(SemanticRating {
                document: "rules/hot.mdc".into(),
                complexity: Some(9),
                compatibility: Some(6),
                issues: vec!["Assumes a memory feature".into()],
                ..Default::default()
            }),
            Some(40.0),
            vec![
                TriggerReason::StaticRegression {
                    current: 130.0,
                    baseline: 40.0,
                    threshold: 80.0,
                    excess_percentage: 62.5,
                },
                TriggerReason::SemanticComplexity { rating: 9, limit: 7 },
                TriggerReason::Conflicts {
                    count: 1,
                    labels: vec![conflict],
                },
            ],
        );
        let calm = Verdict::new(score("rules/calm.mdc", 12.0, vec![]), None, Some(30.0), vec![]);
        let verdicts = vec![hot, calm];

        RunReport {
            generated_at: Local::now(),
            threshold_multiplier: 2.0,
            summary: RunSummary::from_verdicts(&verdicts, 0, 50.0),
            verdicts,
            failures: vec![],
            semantic_failures: vec![],
            recommendations: vec![
                "CRITICAL: rules/hot.mdc is 62.5% over threshold".into(),
                "Consider splitting complex files into smaller, more manageable modules".into(),
            ],
            high_complexity_score: 50.0,
        }
    }

    /// A run where nothing fired
    pub(crate) fn quiet_report() -> RunReport {
        let mut report = test_report();
        report.verdicts.remove(0);
        report.summary = RunSummary::from_verdicts(&report.verdicts, 0, 50.0);
        report.recommendations.clear();
        report
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_every_format_renders() {
        let report = test_report();
        for fmt in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown] {
            let out = report_with_format(&report, fmt).expect("render");
            assert!(out.contains("rules/hot.mdc"), "{} output misses document", fmt);
            let alert = alert_with_format(&report, fmt).expect("render alert");
            assert!(!alert.contains("rules/calm.mdc"), "{} alert leaks clean document", fmt);
        }
    }
}
