//! Init command - write an example rulegauge.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const CONFIG_FILE: &str = "rulegauge.toml";

const DEFAULT_CONFIG: &str = r#"# rulegauge configuration
#
# A document regresses when its static score is greater than
# baseline × threshold_multiplier. Documents without a baseline entry are
# never checked for regression.

threshold_multiplier = 2.0

# Accepted static score per document. Keys match the full relative path or
# any trailing path (a bare file name matches that file in any directory).
[baseline]
"workflow-level4.mdc" = 80
"reflection-comprehensive.mdc" = 70
"architectural-planning.mdc" = 90
"phased-implementation.mdc" = 75
"main-optimized.mdc" = 60
"hierarchical-rule-loading.mdc" = 45
"mode-transition-optimization.mdc" = 40
"optimization-integration.mdc" = 50
"optimized-workflow-level1.mdc" = 30
"optimized-creative-template.mdc" = 35

[weights]
diagram = 5.0
code_block = 2.0
nested_header = 3.0
conditional = 4.0
workflow_step = 2.0

[size]
per_kb = 0.1
soft_limit_kb = 16.0
over_limit_per_kb = 0.5
per_line = 0.0

[thresholds]
semantic_complexity = 7
min_compatibility = 5
high_complexity_score = 50.0

[semantic]
enabled = true
# openai, anthropic, deepinfra, openrouter, ollama
backend = "openai"
# model = "gpt-4o"
pacing_ms = 500
timeout_secs = 60
max_chars = 3000

[discovery]
extensions = ["md", "mdc"]
exclude = []
"#;

/// Run the init command
pub fn run(path: &Path, force: bool) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Edit the baseline table for your rule files", style(CONFIG_FILE).cyan());
    println!("  {} Run the check", style("rulegauge check .").cyan());
    println!(
        "  {} Enable semantic rating",
        style("export OPENAI_API_KEY=...").cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config: rulegauge::config::ProjectConfig =
            toml::from_str(DEFAULT_CONFIG).expect("parse default config");
        config.validate().expect("default config validates");
        assert_eq!(config.baseline_table().len(), 10);
        assert_eq!(config.baseline_table()["main-optimized.mdc"], 60.0);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "threshold_multiplier = 3.0\n[baseline]\n").expect("write");

        run(dir.path(), false).expect("init");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("3.0"));

        run(dir.path(), true).expect("init --force");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("workflow-level4.mdc"));
    }
}
