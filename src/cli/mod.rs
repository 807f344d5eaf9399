//! CLI command definitions and handlers

mod check;
mod files;
mod init;
mod score;

pub use check::CheckOptions;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a threshold multiplier (positive, finite)
fn parse_multiplier(s: &str) -> Result<f64, String> {
    let n: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    rulegauge::config::validate_multiplier(n).map_err(|e| e.to_string())?;
    Ok(n)
}

/// rulegauge - Complexity gate for AI assistant rule documents
#[derive(Parser, Debug)]
#[command(name = "rulegauge")]
#[command(
    version,
    about = "Score the complexity of rule documents (.md/.mdc) and flag regressions against a baseline",
    long_about = "rulegauge scores every rule document in a directory with a deterministic \
static analyzer, optionally asks a language model for a semantic rating, and compares the \
result against a per-file baseline.\n\n\
Run without a subcommand to check the current directory:\n  \
rulegauge",
    after_help = "\
Examples:
  rulegauge                                   Check the current directory
  rulegauge check .cursor --no-semantic       Static checks only
  rulegauge check . --format json             JSON output for scripting
  rulegauge check . --output-dir reports      Write result, summary and alert files
  rulegauge score .cursor/rules/main.mdc      Score breakdown for one document
  rulegauge init                              Create an example rulegauge.toml

Exit status is 1 when any document triggers (unless --no-fail)."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline over a directory and evaluate thresholds
    #[command(after_help = "\
Examples:
  rulegauge check .                              Check current directory
  rulegauge check . --multiplier 1.5             Tighter regression bound
  rulegauge check . --backend anthropic          Rate with Claude models
  rulegauge check . --no-fail --format markdown  Report only, never fail CI")]
    Check {
        /// Directory to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Configuration file (default: rulegauge.toml or .rulegaugerc.json in PATH)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown (or md)
        #[arg(
            long,
            short = 'f',
            default_value = "text",
            value_parser = ["text", "json", "markdown", "md"]
        )]
        format: String,

        /// Directory for complexity-results.json, complexity-summary.md and alert files
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Skip the language-model rating
        #[arg(long)]
        no_semantic: bool,

        /// LLM backend override: openai, anthropic, deepinfra, openrouter, ollama
        #[arg(long)]
        backend: Option<String>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,

        /// Threshold multiplier override
        #[arg(long, value_parser = parse_multiplier)]
        multiplier: Option<f64>,

        /// Exit 0 even when documents trigger
        #[arg(long)]
        no_fail: bool,
    },

    /// Show the static score breakdown of a single document
    Score {
        /// Document to score
        file: PathBuf,

        /// Configuration file for weights (default: built-in weights)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Create an example rulegauge.toml
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing rulegauge.toml
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Check {
            path,
            config,
            format,
            output_dir,
            no_semantic,
            backend,
            model,
            multiplier,
            no_fail,
        }) => check::run(&CheckOptions {
            path,
            config,
            format: format.parse()?,
            output_dir,
            no_semantic,
            backend,
            model,
            multiplier,
            no_fail,
        }),

        Some(Commands::Score {
            file,
            config,
            format,
        }) => score::run(&file, config.as_deref(), format.parse()?),

        Some(Commands::Init { path, force }) => init::run(&path, force),

        None => check::run(&CheckOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_check() {
        let cli = Cli::try_parse_from(["rulegauge"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_check_flags() {
        let cli = Cli::try_parse_from([
            "rulegauge",
            "check",
            "rules",
            "--format",
            "json",
            "--no-semantic",
            "--multiplier",
            "1.5",
            "--no-fail",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Check {
                path,
                format,
                no_semantic,
                multiplier,
                no_fail,
                ..
            }) => {
                assert_eq!(path, PathBuf::from("rules"));
                assert_eq!(format, "json");
                assert!(no_semantic);
                assert_eq!(multiplier, Some(1.5));
                assert!(no_fail);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_multiplier_rejected() {
        assert!(Cli::try_parse_from(["rulegauge", "check", "--multiplier", "0"]).is_err());
        assert!(Cli::try_parse_from(["rulegauge", "check", "--multiplier", "abc"]).is_err());
    }

    #[test]
    fn test_score_requires_file() {
        assert!(Cli::try_parse_from(["rulegauge", "score"]).is_err());
        assert!(Cli::try_parse_from(["rulegauge", "score", "a.mdc"]).is_ok());
    }
}
