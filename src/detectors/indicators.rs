//! Structural indicator counting
//!
//! A single line-oriented pass over the document. Fence state is tracked so
//! that headers and numbered steps inside code samples are not mistaken for
//! document structure.

use crate::config::SizeConfig;
use regex::Regex;
use std::sync::OnceLock;

/// Fence info strings that mark a diagram rather than a code sample
const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "plantuml", "puml", "dot", "graphviz"];

static CONDITIONAL_PATTERN: OnceLock<Regex> = OnceLock::new();
static STEP_PATTERN: OnceLock<Regex> = OnceLock::new();

fn conditional_pattern() -> &'static Regex {
    CONDITIONAL_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:if|else|elif|otherwise|unless|switch)\b").expect("valid regex")
    })
}

fn step_pattern() -> &'static Regex {
    STEP_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*\d+[.)]\s+\S|\b(?:Step|Phase)\s+\d+").expect("valid regex")
    })
}

/// Raw indicator counts for one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorCounts {
    pub diagrams: usize,
    pub code_blocks: usize,
    /// Headers at depth 2 or deeper
    pub nested_headers: usize,
    /// Sum of (depth - 1) over nested headers
    pub header_nesting: usize,
    pub conditionals: usize,
    pub workflow_steps: usize,
}

struct Fence {
    marker: char,
    len: usize,
}

/// Opening or closing fence: three or more backticks or tildes
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    Some((marker, len, trimmed[len..].trim()))
}

/// Header depth for an ATX header line (`## Title` → 2)
fn header_depth(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let depth = trimmed.chars().take_while(|c| *c == '#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    match trimmed[depth..].chars().next() {
        None => Some(depth),
        Some(c) if c.is_whitespace() => Some(depth),
        _ => None,
    }
}

pub fn count_indicators(text: &str) -> IndicatorCounts {
    let mut counts = IndicatorCounts::default();
    let mut fence: Option<Fence> = None;

    for line in text.lines() {
        counts.conditionals += conditional_pattern().find_iter(line).count();

        if let Some((marker, len, info)) = fence_marker(line) {
            match &fence {
                Some(open) => {
                    if marker == open.marker && len >= open.len && info.is_empty() {
                        fence = None;
                    }
                }
                None => {
                    let language = info
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_lowercase();
                    if DIAGRAM_LANGUAGES.contains(&language.as_str()) {
                        counts.diagrams += 1;
                    } else {
                        counts.code_blocks += 1;
                    }
                    fence = Some(Fence { marker, len });
                }
            }
            continue;
        }

        if fence.is_some() {
            continue;
        }

        if let Some(depth) = header_depth(line) {
            if depth >= 2 {
                counts.nested_headers += 1;
                counts.header_nesting += depth - 1;
            }
            continue;
        }

        if step_pattern().is_match(line) {
            counts.workflow_steps += 1;
        }
    }

    counts
}

/// Size contribution: piecewise linear in KB plus an optional per-line term.
pub fn size_contribution(size: &SizeConfig, kb: f64, lines: usize) -> f64 {
    let within = kb.min(size.soft_limit_kb);
    let over = (kb - size.soft_limit_kb).max(0.0);
    size.per_kb * within + size.over_limit_per_kb * over + size.per_line * lines as f64
}
