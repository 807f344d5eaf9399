//! Static complexity analysis
//!
//! Derives a deterministic score from document structure alone.
//!
//! # Scoring
//!
//! ```text
//! total = Σ count(kind) × weight(kind)        (diagrams, code blocks,
//!                                              conditionals, workflow steps)
//!       + weight(header) × Σ (depth − 1)      (headers at depth ≥ 2)
//!       + size(kb, lines)                      (piecewise linear)
//! ```
//!
//! Conflict and best-practice rules run over the same text but only add
//! labels to the score; they never change the total.
//!
//! # Usage
//!
//! ```ignore
//! let config = load_project_config(root)?;
//! let analyzer = StaticAnalyzer::new(&config.weights, &config.size);
//! let score = analyzer.analyze(&document);
//! ```

mod indicators;
mod rules;

pub use indicators::{count_indicators, size_contribution, IndicatorCounts};
pub use rules::{conflict_labels, violation_labels};

use crate::config::{IndicatorWeights, SizeConfig};
use crate::models::{Document, FindingKind, StaticScore, StructuralFinding};
use tracing::debug;

/// Pure, deterministic document scorer
#[derive(Debug, Clone, Copy)]
pub struct StaticAnalyzer<'a> {
    weights: &'a IndicatorWeights,
    size: &'a SizeConfig,
}

impl<'a> StaticAnalyzer<'a> {
    pub fn new(weights: &'a IndicatorWeights, size: &'a SizeConfig) -> Self {
        Self { weights, size }
    }

    pub fn analyze(&self, document: &Document) -> StaticScore {
        let text = document.content();
        let counts = count_indicators(text);
        let findings = self.findings(&counts, document);

        let score = StaticScore::new(
            document.id(),
            findings,
            conflict_labels(text),
            violation_labels(text),
            document.line_count(),
            document.size_kb(),
        );
        debug!(
            "{}: static score {:.1} ({} findings, {} conflicts, {} violations)",
            document.id(),
            score.total,
            score.findings.len(),
            score.conflicts.len(),
            score.violations.len()
        );
        score
    }

    /// One finding per kind with a non-zero count, in [`FindingKind::ALL`] order
    fn findings(&self, counts: &IndicatorCounts, document: &Document) -> Vec<StructuralFinding> {
        let mut findings = Vec::new();
        for kind in FindingKind::ALL {
            let finding = match kind {
                FindingKind::Size => {
                    if document.is_empty() {
                        continue;
                    }
                    StructuralFinding {
                        kind,
                        count: document.byte_size(),
                        weight: self.size.per_kb,
                        contribution: size_contribution(
                            self.size,
                            document.size_kb(),
                            document.line_count(),
                        ),
                    }
                }
                FindingKind::NestedHeader => {
                    let weight = self.weights.weight(kind);
                    StructuralFinding {
                        kind,
                        count: counts.nested_headers,
                        weight,
                        contribution: weight * counts.header_nesting as f64,
                    }
                }
                _ => {
                    let count = match kind {
                        FindingKind::Diagram => counts.diagrams,
                        FindingKind::CodeBlock => counts.code_blocks,
                        FindingKind::Conditional => counts.conditionals,
                        FindingKind::WorkflowStep => counts.workflow_steps,
                        FindingKind::NestedHeader | FindingKind::Size => 0,
                    };
                    let weight = self.weights.weight(kind);
                    StructuralFinding {
                        kind,
                        count,
                        weight,
                        contribution: weight * count as f64,
                    }
                }
            };
            if finding.count > 0 {
                findings.push(finding);
            }
        }
        findings
    }
}
