//! Document discovery for the check command.
//!
//! Walks the root honouring `.gitignore`, including hidden directories such
//! as `.cursor/rules`, and picks files by extension.

use anyhow::Result;
use ignore::WalkBuilder;
use rulegauge::config::DiscoveryConfig;
use rulegauge::models::document_id;
use rulegauge::reporters::{ALERT_MARKDOWN_FILE, SUMMARY_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Collect every rule document under `root`, sorted by path
pub(super) fn collect_documents(root: &Path, discovery: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(".rulegaugeignore")
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in builder.build().flatten() {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if !has_extension(path, &discovery.extensions) {
            continue;
        }
        // Our own artifacts are never inputs
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name == SUMMARY_FILE || name == ALERT_MARKDOWN_FILE {
            continue;
        }
        if is_excluded(&document_id(root, path), &discovery.exclude) {
            debug!("Excluded {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// `id` lies under one of the `prefixes` (component-wise)
fn is_excluded(id: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        !prefix.is_empty()
            && (id == prefix
                || (id.starts_with(prefix) && id.as_bytes().get(prefix.len()) == Some(&b'/')))
    })
}
