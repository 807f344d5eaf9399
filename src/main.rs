//! rulegauge - complexity gate for AI assistant rule documents
//!
//! Scores rule documents, compares them against a per-file baseline and
//! exits non-zero when any document triggers.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rulegauge={}", cli.log_level)));

    // Initialize logging on stderr so report output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
