//! JSON reporter
//!
//! Outputs the full RunReport as pretty-printed JSON, one verdict per
//! document. The alert variant carries the triggered verdicts only.

use crate::models::RunReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the triggered subset as JSON
pub fn render_alert(report: &RunReport) -> Result<String> {
    render(&report.alert_subset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{quiet_report, test_report};

    #[test]
    fn test_json_render_contains_all_verdicts() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");

        let verdicts = parsed["verdicts"].as_array().expect("verdicts array");
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0]["document"], "rules/hot.mdc");
        assert_eq!(verdicts[0]["triggered"], true);
        assert_eq!(verdicts[0]["reasons"][0]["rule"], "static_regression");
        assert_eq!(verdicts[0]["reasons"][0]["threshold"], 80.0);
        assert_eq!(verdicts[0]["static_score"]["findings"][0]["kind"], "CONDITIONAL");
        assert_eq!(verdicts[1]["triggered"], false);
        assert!(verdicts[1]["semantic"].is_null());
        assert_eq!(parsed["summary"]["documents_triggered"], 1);
    }

    #[test]
    fn test_json_alert_has_triggered_only() {
        let report = test_report();
        let parsed: serde_json::Value =
            serde_json::from_str(&render_alert(&report).expect("render")).expect("parse JSON");
        let verdicts = parsed["verdicts"].as_array().expect("verdicts array");
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0]["document"], "rules/hot.mdc");
        assert_eq!(parsed["summary"]["documents_analyzed"], 1);
        assert!(!parsed.to_string().contains("rules/calm.mdc"));
    }

    #[test]
    fn test_json_round_trips_into_report() {
        let json_str = render(&test_report()).expect("render JSON");
        let back: RunReport = serde_json::from_str(&json_str).expect("deserialize");
        assert_eq!(back.verdicts, test_report().verdicts);
    }

    #[test]
    fn test_json_quiet_alert_is_empty() {
        let parsed: serde_json::Value =
            serde_json::from_str(&render_alert(&quiet_report()).expect("render")).expect("parse");
        assert_eq!(parsed["verdicts"].as_array().expect("array").len(), 0);
    }
}
