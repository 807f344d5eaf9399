//! Core data models for rulegauge
//!
//! These models flow through the whole pipeline: documents are scored by the
//! static analyzer, optionally rated by the semantic analyzer, and merged into
//! verdicts by the threshold evaluator.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a document from disk
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 (byte offset {offset})")]
    NotUtf8 { path: PathBuf, offset: usize },
}

/// One analyzable rule document
///
/// Immutable once loaded. The identifier is the path relative to the
/// analysed root, always with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: String,
    content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Load a document, identifying it relative to `root`.
    ///
    /// Content must be valid UTF-8; anything else is an input error for
    /// this document only.
    pub fn load(root: &Path, path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|e| DocumentError::NotUtf8 {
            path: path.to_path_buf(),
            offset: e.utf8_error().valid_up_to(),
        })?;
        Ok(Self::new(document_id(root, path), content))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    pub fn byte_size(&self) -> usize {
        self.content.len()
    }

    pub fn size_kb(&self) -> f64 {
        self.content.len() as f64 / 1024.0
    }
}

/// Build a stable identifier for `path` relative to `root`.
pub fn document_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Kind of structural indicator found in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    Diagram,
    CodeBlock,
    NestedHeader,
    Conditional,
    WorkflowStep,
    Size,
}

impl FindingKind {
    /// Order in which findings appear in a score
    pub const ALL: [FindingKind; 6] = [
        FindingKind::Diagram,
        FindingKind::CodeBlock,
        FindingKind::NestedHeader,
        FindingKind::Conditional,
        FindingKind::WorkflowStep,
        FindingKind::Size,
    ];
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingKind::Diagram => write!(f, "DIAGRAM"),
            FindingKind::CodeBlock => write!(f, "CODE_BLOCK"),
            FindingKind::NestedHeader => write!(f, "NESTED_HEADER"),
            FindingKind::Conditional => write!(f, "CONDITIONAL"),
            FindingKind::WorkflowStep => write!(f, "WORKFLOW_STEP"),
            FindingKind::Size => write!(f, "SIZE"),
        }
    }
}

/// A single structural observation and what it adds to the static score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralFinding {
    pub kind: FindingKind,
    /// Occurrences for indicator kinds, bytes for `Size`
    pub count: usize,
    pub weight: f64,
    pub contribution: f64,
}

/// Deterministic static complexity of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticScore {
    pub document: String,
    pub total: f64,
    pub findings: Vec<StructuralFinding>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    pub line_count: usize,
    pub size_kb: f64,
}

impl StaticScore {
    /// Assemble a score; the total is always the sum of the findings.
    pub fn new(
        document: impl Into<String>,
        findings: Vec<StructuralFinding>,
        conflicts: Vec<String>,
        violations: Vec<String>,
        line_count: usize,
        size_kb: f64,
    ) -> Self {
        let total = findings.iter().map(|f| f.contribution).sum();
        Self {
            document: document.into(),
            total,
            findings,
            conflicts,
            violations,
            line_count,
            size_kb,
        }
    }

    pub fn finding(&self, kind: FindingKind) -> Option<&StructuralFinding> {
        self.findings.iter().find(|f| f.kind == kind)
    }
}

/// Qualitative rating returned by the language model
///
/// Either axis may be missing when the model omitted it or returned
/// something that was not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SemanticRating {
    pub document: String,
    pub complexity: Option<u8>,
    pub compatibility: Option<u8>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    /// Tooling-compatibility issues the model listed
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Why a verdict was triggered, with the measured and threshold values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TriggerReason {
    StaticRegression {
        current: f64,
        baseline: f64,
        threshold: f64,
        excess_percentage: f64,
    },
    SemanticComplexity {
        rating: u8,
        limit: u8,
    },
    Compatibility {
        rating: u8,
        floor: u8,
    },
    Conflicts {
        count: usize,
        labels: Vec<String>,
    },
    Violations {
        count: usize,
        labels: Vec<String>,
    },
}

impl TriggerReason {
    pub fn rule(&self) -> &'static str {
        match self {
            TriggerReason::StaticRegression { .. } => "static_regression",
            TriggerReason::SemanticComplexity { .. } => "semantic_complexity",
            TriggerReason::Compatibility { .. } => "compatibility",
            TriggerReason::Conflicts { .. } => "conflicts",
            TriggerReason::Violations { .. } => "violations",
        }
    }

    /// Regressions more than 50% over the threshold are critical
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            TriggerReason::StaticRegression { excess_percentage, .. } if *excess_percentage > 50.0
        )
    }

    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            TriggerReason::SemanticComplexity { .. } | TriggerReason::Compatibility { .. }
        )
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::StaticRegression {
                current,
                baseline,
                threshold,
                excess_percentage,
            } => write!(
                f,
                "static score {:.1} > threshold {:.1} (baseline {:.1}, {:.1}% over)",
                current, threshold, baseline, excess_percentage
            ),
            TriggerReason::SemanticComplexity { rating, limit } => {
                write!(f, "semantic complexity {}/10 > {}", rating, limit)
            }
            TriggerReason::Compatibility { rating, floor } => {
                write!(f, "compatibility {}/10 < {}", rating, floor)
            }
            TriggerReason::Conflicts { count, .. } => write!(f, "{} rule conflict(s)", count),
            TriggerReason::Violations { count, .. } => {
                write!(f, "{} best practice violation(s)", count)
            }
        }
    }
}

/// Per-document outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub document: String,
    pub triggered: bool,
    pub reasons: Vec<TriggerReason>,
    /// Baseline the static score was compared against, if any
    pub baseline: Option<f64>,
    pub static_score: StaticScore,
    pub semantic: Option<SemanticRating>,
}

impl Verdict {
    pub fn new(
        static_score: StaticScore,
        semantic: Option<SemanticRating>,
        baseline: Option<f64>,
        reasons: Vec<TriggerReason>,
    ) -> Self {
        Self {
            document: static_score.document.clone(),
            triggered: !reasons.is_empty(),
            reasons,
            baseline,
            static_score,
            semantic,
        }
    }
}

/// A document that could not be analysed, or whose rating failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document: String,
    pub error: String,
}

/// Aggregate statistics over one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents_analyzed: usize,
    pub documents_failed: usize,
    pub documents_triggered: usize,
    pub semantic_ratings: usize,
    pub total_complexity: f64,
    pub average_complexity: f64,
    pub total_size_kb: f64,
    pub total_lines: usize,
    pub documents_with_conflicts: usize,
    pub documents_with_violations: usize,
    /// Documents whose static score exceeds the high-complexity mark,
    /// highest score first
    pub high_complexity: Vec<String>,
    /// Sum of baselines for documents that have one
    pub total_baseline: f64,
    /// Sum of current scores for the same documents
    pub total_current: f64,
}

impl RunSummary {
    pub fn from_verdicts(verdicts: &[Verdict], failed: usize, high_complexity_score: f64) -> Self {
        let mut summary = Self {
            documents_analyzed: verdicts.len(),
            documents_failed: failed,
            ..Default::default()
        };
        let mut high: Vec<(String, f64)> = Vec::new();
        for v in verdicts {
            let score = &v.static_score;
            if v.triggered {
                summary.documents_triggered += 1;
            }
            if v.semantic.is_some() {
                summary.semantic_ratings += 1;
            }
            summary.total_complexity += score.total;
            summary.total_size_kb += score.size_kb;
            summary.total_lines += score.line_count;

            let semantic_conflicts = v.semantic.as_ref().is_some_and(|r| !r.conflicts.is_empty());
            let semantic_violations = v.semantic.as_ref().is_some_and(|r| !r.violations.is_empty());
            if !score.conflicts.is_empty() || semantic_conflicts {
                summary.documents_with_conflicts += 1;
            }
            if !score.violations.is_empty() || semantic_violations {
                summary.documents_with_violations += 1;
            }
            if score.total > high_complexity_score {
                high.push((v.document.clone(), score.total));
            }
            if let Some(baseline) = v.baseline {
                summary.total_baseline += baseline;
                summary.total_current += score.total;
            }
        }
        if !verdicts.is_empty() {
            summary.average_complexity = summary.total_complexity / verdicts.len() as f64;
        }
        // Highest score first
        high.sort_by(|a, b| b.1.total_cmp(&a.1));
        summary.high_complexity = high.into_iter().map(|(doc, _)| doc).collect();
        summary
    }
}

/// Full record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Local>,
    pub threshold_multiplier: f64,
    pub verdicts: Vec<Verdict>,
    /// Documents excluded from scoring because they could not be loaded
    #[serde(default)]
    pub failures: Vec<DocumentFailure>,
    /// Documents whose semantic rating was unavailable
    #[serde(default)]
    pub semantic_failures: Vec<DocumentFailure>,
    pub summary: RunSummary,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Static score above which a document counts as high complexity
    #[serde(default = "default_high_complexity_score")]
    pub high_complexity_score: f64,
}

/// Static score above which a document counts as high complexity
pub const DEFAULT_HIGH_COMPLEXITY_SCORE: f64 = 50.0;

fn default_high_complexity_score() -> f64 {
    DEFAULT_HIGH_COMPLEXITY_SCORE
}

impl RunReport {
    pub fn triggered(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.triggered)
    }

    pub fn any_triggered(&self) -> bool {
        self.verdicts.iter().any(|v| v.triggered)
    }

    /// Copy of this report restricted to triggered documents.
    ///
    /// Load failures are dropped and the summary is recomputed, so no
    /// untriggered document is named anywhere in the subset.
    pub fn alert_subset(&self) -> RunReport {
        let verdicts: Vec<Verdict> = self.triggered().cloned().collect();
        let semantic_failures = self
            .semantic_failures
            .iter()
            .filter(|f| verdicts.iter().any(|v| v.document == f.document))
            .cloned()
            .collect();
        RunReport {
            generated_at: self.generated_at,
            threshold_multiplier: self.threshold_multiplier,
            summary: RunSummary::from_verdicts(&verdicts, 0, self.high_complexity_score),
            verdicts,
            failures: Vec::new(),
            semantic_failures,
            recommendations: self.recommendations.clone(),
            high_complexity_score: self.high_complexity_score,
        }
    }
}
