//! Score command - static breakdown of one document

use anyhow::{Context, Result};
use console::style;
use rulegauge::config::{load_scoring_config, ProjectConfig};
use rulegauge::detectors::StaticAnalyzer;
use rulegauge::models::{Document, StaticScore};
use rulegauge::reporters::OutputFormat;
use std::path::Path;

/// Run the score command
pub fn run(file: &Path, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = match config {
        Some(path) => load_scoring_config(path)?,
        None => ProjectConfig::default(),
    };

    let root = file.parent().unwrap_or(Path::new("."));
    let document = Document::load(root, file)
        .with_context(|| format!("Cannot score {}", file.display()))?;
    let score = StaticAnalyzer::new(&config.weights, &config.size).analyze(&document);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&score)?),
        _ => print!("{}", render_breakdown(&score)),
    }
    Ok(())
}

fn render_breakdown(score: &StaticScore) -> String {
    let mut out = format!(
        "\n{}  {} lines, {:.1} KB\n\n",
        style(&score.document).bold(),
        score.line_count,
        score.size_kb
    );

    if score.findings.is_empty() {
        out.push_str(&format!("  {}\n", style("no structural findings").dim()));
    } else {
        out.push_str(&format!(
            "  {}\n",
            style(format!("{:<14} {:>7} {:>7} {:>9}", "KIND", "COUNT", "WEIGHT", "SCORE")).dim()
        ));
        for f in &score.findings {
            out.push_str(&format!(
                "  {:<14} {:>7} {:>7.2} {:>9.2}\n",
                f.kind.to_string(),
                f.count,
                f.weight,
                f.contribution
            ));
        }
    }
    out.push_str(&format!(
        "\n  Total: {}\n",
        style(format!("{:.2}", score.total)).cyan().bold()
    ));

    for label in &score.conflicts {
        out.push_str(&format!("  {} {}\n", style("conflict").yellow(), label));
    }
    for label in &score.violations {
        out.push_str(&format!("  {} {}\n", style("violation").red(), label));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_lists_findings_and_labels() {
        let config = ProjectConfig::default();
        let doc = Document::new("a.mdc", "# A\n## B\nif x\nStatus: BLOCKED\n");
        let score = StaticAnalyzer::new(&config.weights, &config.size).analyze(&doc);
        let out = render_breakdown(&score);
        assert!(out.contains("NESTED_HEADER"));
        assert!(out.contains("CONDITIONAL"));
        assert!(out.contains("Blocking rule detected: 1 instances"));
    }

    #[test]
    fn test_breakdown_empty_document() {
        let config = ProjectConfig::default();
        let analyzer = StaticAnalyzer::new(&config.weights, &config.size);
        let score = analyzer.analyze(&Document::new("e.mdc", ""));
        assert!(render_breakdown(&score).contains("no structural findings"));
    }
}
