//! Check command - score, rate and gate a directory of rule documents

use super::files::collect_documents;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rulegauge::ai::{AiClient, AiConfig, AiError, LlmBackend, SemanticAnalyzer};
use rulegauge::config::{load_config_file, load_project_config, validate_multiplier, ProjectConfig};
use rulegauge::models::RunReport;
use rulegauge::pipeline::{load_documents, Pipeline};
use rulegauge::reporters::{self, OutputFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for one `check` run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
    pub no_semantic: bool,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub multiplier: Option<f64>,
    pub no_fail: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            config: None,
            format: OutputFormat::Text,
            output_dir: None,
            no_semantic: false,
            backend: None,
            model: None,
            multiplier: None,
            no_fail: false,
        }
    }
}

/// Run the check command
pub fn run(opts: &CheckOptions) -> Result<()> {
    let root = opts
        .path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", opts.path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    // Configuration errors are fatal and surface before any document is read
    let config = load_config(&root, opts)?;
    let quiet = opts.format != OutputFormat::Text;

    let paths = collect_documents(&root, &config.discovery)?;
    if !quiet {
        eprintln!(
            "{}Found {} rule documents in {}",
            style("✓ ").green(),
            style(paths.len()).cyan(),
            style(root.display()).dim()
        );
    }

    let (documents, failures) = load_documents(&root, &paths);

    let mut pipeline = Pipeline::new(&config);
    if let Some(analyzer) = semantic_analyzer(&config, quiet)? {
        pipeline = pipeline.with_semantic(analyzer);
    }

    let bar = progress_bar(documents.len() as u64, quiet);
    let report = pipeline.run_with_progress(&documents, failures, |verdict| {
        bar.set_message(verdict.document.clone());
        bar.inc(1);
    });
    bar.finish_and_clear();

    let output = reporters::report_with_format(&report, opts.format)?;
    println!("{}", output);

    if let Some(dir) = &opts.output_dir {
        let written = reporters::write_artifacts(&report, dir)?;
        for path in &written {
            eprintln!("{}Wrote {}", style("📄 ").bold(), style(path.display()).cyan());
        }
    }

    check_fail_threshold(opts.no_fail, &report);
    Ok(())
}

/// Load the configuration and apply command-line overrides
fn load_config(root: &Path, opts: &CheckOptions) -> Result<ProjectConfig> {
    let mut config = match &opts.config {
        Some(path) => load_config_file(path)?,
        None => load_project_config(root)?,
    };

    if let Some(multiplier) = opts.multiplier {
        validate_multiplier(multiplier)?;
        config.threshold_multiplier = multiplier;
    }
    if let Some(backend) = &opts.backend {
        let parsed: LlmBackend = backend.parse()?;
        config.semantic.backend = parsed.to_string();
    }
    if let Some(model) = &opts.model {
        config.semantic.model = Some(model.clone());
    }
    if opts.no_semantic {
        config.semantic.enabled = false;
    }

    info!(
        "Config: multiplier {:.2}, {} baseline entries, semantic {}",
        config.threshold_multiplier,
        config.baseline.as_ref().map_or(0, |b| b.len()),
        if config.semantic.enabled { "on" } else { "off" }
    );
    Ok(config)
}

/// Build the semantic analyzer, or `None` when it is disabled or has no key
fn semantic_analyzer(config: &ProjectConfig, quiet: bool) -> Result<Option<SemanticAnalyzer>> {
    if !config.semantic.enabled {
        debug!("Semantic analysis disabled");
        return Ok(None);
    }

    let ai_config = AiConfig::from_semantic(&config.semantic)?;
    match AiClient::from_env_with_config(ai_config) {
        Ok(client) => {
            if !quiet {
                eprintln!(
                    "{}Semantic rating with {} ({})",
                    style("✓ ").green(),
                    style(client.backend()).cyan(),
                    style(client.model()).dim()
                );
            }
            Ok(Some(SemanticAnalyzer::from_config(
                Box::new(client),
                &config.semantic,
            )))
        }
        Err(e @ AiError::MissingApiKey { .. }) => {
            eprintln!(
                "{} {}\n   Continuing with static analysis only (use --no-semantic to silence this).",
                style("⚠").yellow(),
                e
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Create bar progress style
fn progress_bar(len: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");
    let bar = ProgressBar::new(len);
    bar.set_style(style);
    bar
}

/// Exit 1 when any verdict triggered, unless `--no-fail`
fn check_fail_threshold(no_fail: bool, report: &RunReport) {
    if !report.any_triggered() {
        return;
    }
    if no_fail {
        eprintln!(
            "{} {} documents triggered (--no-fail set, exiting 0)",
            style("⚠").yellow(),
            report.summary.documents_triggered
        );
        return;
    }
    eprintln!(
        "Failing: {} of {} documents triggered",
        report.summary.documents_triggered, report.summary.documents_analyzed
    );
    std::process::exit(1);
}
