//! Run artifacts written to an output directory
//!
//! ```text
//! complexity-results.json   full record, every document
//! complexity-summary.md     condensed summary
//! complexity-alert.json     triggered subset (only when something triggered)
//! complexity-alert.md       alert text       (only when something triggered)
//! ```

use crate::models::RunReport;
use crate::reporters::{json, markdown};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RESULTS_FILE: &str = "complexity-results.json";
pub const SUMMARY_FILE: &str = "complexity-summary.md";
pub const ALERT_JSON_FILE: &str = "complexity-alert.json";
pub const ALERT_MARKDOWN_FILE: &str = "complexity-alert.md";

/// Write every artifact for `report` into `dir`, returning the paths written.
///
/// Alert files from an earlier run are removed when nothing triggered, so a
/// stale alert never outlives the run that produced it.
pub fn write_artifacts(report: &RunReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut written = vec![
        write_file(dir, RESULTS_FILE, &json::render(report)?)?,
        write_file(dir, SUMMARY_FILE, &markdown::render(report)?)?,
    ];

    if report.any_triggered() {
        written.push(write_file(dir, ALERT_JSON_FILE, &json::render_alert(report)?)?);
        written.push(write_file(
            dir,
            ALERT_MARKDOWN_FILE,
            &markdown::render_alert(report)?,
        )?);
    } else {
        for name in [ALERT_JSON_FILE, ALERT_MARKDOWN_FILE] {
            let stale = dir.join(name);
            if stale.is_file() {
                debug!("Removing stale {}", stale.display());
                std::fs::remove_file(&stale)
                    .with_context(|| format!("failed to remove {}", stale.display()))?;
            }
        }
    }

    Ok(written)
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{quiet_report, test_report};

    #[test]
    fn test_alert_artifacts_only_when_triggered() {
        let dir = tempfile::tempdir().expect("tempdir");

        let written = write_artifacts(&test_report(), dir.path()).expect("write");
        assert_eq!(written.len(), 4);
        assert!(dir.path().join(ALERT_JSON_FILE).is_file());
        assert!(dir.path().join(ALERT_MARKDOWN_FILE).is_file());

        let written = write_artifacts(&quiet_report(), dir.path()).expect("write");
        assert_eq!(written.len(), 2);
        assert!(dir.path().join(RESULTS_FILE).is_file());
        assert!(dir.path().join(SUMMARY_FILE).is_file());
        assert!(!dir.path().join(ALERT_JSON_FILE).exists());
        assert!(!dir.path().join(ALERT_MARKDOWN_FILE).exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out").join("reports");
        write_artifacts(&quiet_report(), &nested).expect("write");
        assert!(nested.join(RESULTS_FILE).is_file());
    }
}
