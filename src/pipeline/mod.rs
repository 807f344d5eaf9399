//! Per-run analysis pipeline
//!
//! Orchestrates one run over a set of documents:
//! 1. Score each document with the static analyzer
//! 2. Rate it with the semantic analyzer (if one is attached)
//! 3. Look up its baseline and evaluate thresholds
//! 4. Aggregate verdicts into a [`RunReport`]
//!
//! Documents are processed sequentially. A document that fails to load, or
//! whose semantic rating fails, never stops the run.

use crate::ai::SemanticAnalyzer;
use crate::config::ProjectConfig;
use crate::detectors::StaticAnalyzer;
use crate::models::{Document, DocumentFailure, RunReport, RunSummary, TriggerReason, Verdict};
use crate::scoring::{BaselineStore, ThresholdEvaluator};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// More semantic warnings than this suggests consolidating rule files
const CONSOLIDATE_WARNING_LIMIT: usize = 5;

/// Full analysis pipeline.
pub struct Pipeline<'a> {
    config: &'a ProjectConfig,
    analyzer: StaticAnalyzer<'a>,
    baselines: BaselineStore,
    evaluator: ThresholdEvaluator,
    semantic: Option<SemanticAnalyzer>,
}

impl<'a> Pipeline<'a> {
    /// Create a static-only pipeline from a validated configuration.
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self {
            config,
            analyzer: StaticAnalyzer::new(&config.weights, &config.size),
            baselines: BaselineStore::new(config.baseline_table()),
            evaluator: ThresholdEvaluator::from_config(config),
            semantic: None,
        }
    }

    /// Attach a semantic analyzer.
    pub fn with_semantic(mut self, analyzer: SemanticAnalyzer) -> Self {
        self.semantic = Some(analyzer);
        self
    }

    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    /// Analyze one document.
    ///
    /// Returns the verdict and, when the semantic rating was attempted but
    /// failed, the reason it is missing.
    pub fn analyze_document(&mut self, document: &Document) -> (Verdict, Option<DocumentFailure>) {
        let score = self.analyzer.analyze(document);

        let mut semantic_failure = None;
        let rating = match self.semantic.as_mut() {
            Some(semantic) => match semantic.rate_document(document) {
                Ok(rating) => Some(rating),
                Err(e) => {
                    warn!("Semantic rating unavailable for {}: {}", document.id(), e);
                    semantic_failure = Some(DocumentFailure {
                        document: document.id().to_string(),
                        error: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let baseline = self.baselines.lookup(document.id());
        if baseline.is_none() {
            debug!("{}: no baseline entry, regression check skipped", document.id());
        }

        (self.evaluator.evaluate(score, rating, baseline), semantic_failure)
    }

    /// Run over `documents`; `failures` are documents that never loaded.
    pub fn run(&mut self, documents: &[Document], failures: Vec<DocumentFailure>) -> RunReport {
        self.run_with_progress(documents, failures, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_verdict` after each document.
    pub fn run_with_progress<F>(
        &mut self,
        documents: &[Document],
        failures: Vec<DocumentFailure>,
        mut on_verdict: F,
    ) -> RunReport
    where
        F: FnMut(&Verdict),
    {
        let mut verdicts = Vec::with_capacity(documents.len());
        let mut semantic_failures = Vec::new();

        for document in documents {
            let (verdict, semantic_failure) = self.analyze_document(document);
            on_verdict(&verdict);
            verdicts.push(verdict);
            semantic_failures.extend(semantic_failure);
        }

        let summary = RunSummary::from_verdicts(
            &verdicts,
            failures.len(),
            self.config.thresholds.high_complexity_score,
        );
        let recommendations = recommendations(&verdicts);

        info!(
            "Analyzed {} documents ({} triggered, {} failed, {} semantic failures)",
            summary.documents_analyzed,
            summary.documents_triggered,
            summary.documents_failed,
            semantic_failures.len()
        );

        RunReport {
            generated_at: Local::now(),
            threshold_multiplier: self.evaluator.multiplier(),
            verdicts,
            failures,
            semantic_failures,
            summary,
            recommendations,
            high_complexity_score: self.config.thresholds.high_complexity_score,
        }
    }
}

/// Load every path, splitting successes from per-document failures.
///
/// Identifiers are relative to `root`. A failure is excluded from scoring,
/// never treated as a score of 0.
pub fn load_documents(root: &Path, paths: &[PathBuf]) -> (Vec<Document>, Vec<DocumentFailure>) {
    let mut documents = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        match Document::load(root, path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                failures.push(DocumentFailure {
                    document: crate::models::document_id(root, path),
                    error: e.to_string(),
                });
            }
        }
    }

    (documents, failures)
}

/// Advice derived from which rules fired across the run
pub fn recommendations(verdicts: &[Verdict]) -> Vec<String> {
    let mut recs = Vec::new();

    for verdict in verdicts {
        for reason in &verdict.reasons {
            if let TriggerReason::StaticRegression {
                excess_percentage, ..
            } = reason
            {
                if reason.is_critical() {
                    recs.push(format!(
                        "CRITICAL: {} is {:.1}% over threshold",
                        verdict.document, excess_percentage
                    ));
                } else {
                    recs.push(format!(
                        "WARNING: {} exceeds threshold by {:.1}%",
                        verdict.document, excess_percentage
                    ));
                }
            }
        }
    }

    let fired = |rule: &str| {
        verdicts
            .iter()
            .flat_map(|v| v.reasons.iter())
            .any(|r| r.rule() == rule)
    };

    if fired("static_regression") {
        recs.push(
            "Consider splitting complex files into smaller, more manageable modules".to_string(),
        );
    }
    if fired("conflicts") {
        recs.push(
            "Review and simplify mandatory rules that might be causing conflicts".to_string(),
        );
    }
    if fired("violations") {
        recs.push("Address best practice violations in code examples".to_string());
    }
    if fired("compatibility") {
        recs.push("Simplify complex workflows to improve tooling compatibility".to_string());
    }

    let semantic_warnings = verdicts
        .iter()
        .flat_map(|v| v.reasons.iter())
        .filter(|r| r.is_semantic())
        .count();
    if semantic_warnings > CONSOLIDATE_WARNING_LIMIT {
        recs.push("Consider consolidating similar rule files to reduce complexity".to_string());
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, AiResult, RatingProvider};
    use std::collections::BTreeMap;
    use std::time::Duration;

    struct StubProvider(&'static str);

    impl RatingProvider for StubProvider {
        fn rate(&self, _text: &str, _instructions: &str) -> AiResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct TimeoutProvider;

    impl RatingProvider for TimeoutProvider {
        fn rate(&self, _text: &str, _instructions: &str) -> AiResult<String> {
            Err(AiError::ApiError {
                status: 0,
                message: "request timed out".to_string(),
            })
        }
    }

    fn config_with_baseline(entries: &[(&str, f64)]) -> ProjectConfig {
        ProjectConfig {
            baseline: Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    fn semantic(provider: impl RatingProvider + 'static) -> SemanticAnalyzer {
        SemanticAnalyzer::new(Box::new(provider), Duration::ZERO, 3000)
    }

    #[test]
    fn test_static_only_run() {
        let config = config_with_baseline(&[("quiet.mdc", 10.0), ("loud.mdc", 0.5)]);
        let docs = vec![
            Document::new("quiet.mdc", "# Quiet\n\nplain text\n"),
            Document::new("loud.mdc", "# Loud\n\nif a then b\nif c then d\n"),
            Document::new("new.mdc", "# New\n"),
        ];

        let mut pipeline = Pipeline::new(&config);
        assert!(!pipeline.has_semantic());
        let report = pipeline.run(&docs, vec![]);

        assert_eq!(report.verdicts.len(), 3);
        assert_eq!(report.summary.documents_analyzed, 3);
        let triggered: Vec<&str> = report.triggered().map(|v| v.document.as_str()).collect();
        assert_eq!(triggered, vec!["loud.mdc"]);
        assert!(report.any_triggered());
        assert!(report.semantic_failures.is_empty());
        assert!(report.verdicts.iter().all(|v| v.semantic.is_none()));
    }

    #[test]
    fn test_semantic_failure_keeps_static_rules() {
        let config = config_with_baseline(&[("a.mdc", 0.1)]);
        let docs = vec![Document::new("a.mdc", "# A\nif x\nStatus: BLOCKED\n")];

        let mut pipeline = Pipeline::new(&config).with_semantic(semantic(TimeoutProvider));
        let report = pipeline.run(&docs, vec![]);

        let verdict = &report.verdicts[0];
        assert!(verdict.semantic.is_none());
        assert!(verdict.triggered);
        let rules: Vec<&str> = verdict.reasons.iter().map(|r| r.rule()).collect();
        assert_eq!(rules, vec!["static_regression", "conflicts"]);
        assert_eq!(report.semantic_failures.len(), 1);
        assert_eq!(report.semantic_failures[0].document, "a.mdc");
    }

    #[test]
    fn test_semantic_rating_attached_and_evaluated() {
        let config = ProjectConfig::default();
        let docs = vec![
            Document::new("a.mdc", "# A\n"),
            Document::new("b.mdc", "# B\n"),
        ];
        let provider = StubProvider(r#"{"complexity_rating": 8, "cursor_compatibility": 4}"#);

        let mut pipeline = Pipeline::new(&config).with_semantic(semantic(provider));
        let report = pipeline.run(&docs, vec![]);

        assert_eq!(report.summary.semantic_ratings, 2);
        assert_eq!(report.summary.documents_triggered, 2);
        for verdict in &report.verdicts {
            let rules: Vec<&str> = verdict.reasons.iter().map(|r| r.rule()).collect();
            assert_eq!(rules, vec!["semantic_complexity", "compatibility"]);
        }
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("tooling compatibility")));
    }

    #[test]
    fn test_load_failures_are_excluded_from_scoring() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.mdc");
        let bad = dir.path().join("bad.mdc");
        let missing = dir.path().join("missing.mdc");
        std::fs::write(&good, "# Good\n").expect("write");
        std::fs::write(&bad, [0xffu8, 0xfe, 0x00]).expect("write");

        let (docs, failures) = load_documents(dir.path(), &[good, bad, missing]);
        assert_eq!(docs.len(), 1);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].document, "bad.mdc");

        let config = ProjectConfig::default();
        let report = Pipeline::new(&config).run(&docs, failures);
        assert_eq!(report.verdicts.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.summary.documents_failed, 2);
    }

    #[test]
    fn test_progress_callback_sees_every_document() {
        let config = ProjectConfig::default();
        let docs = vec![Document::new("a.mdc", "a"), Document::new("b.mdc", "b")];
        let mut seen = Vec::new();
        Pipeline::new(&config).run_with_progress(&docs, vec![], |v| seen.push(v.document.clone()));
        assert_eq!(seen, vec!["a.mdc", "b.mdc"]);
    }

    #[test]
    fn test_empty_run() {
        let config = ProjectConfig::default();
        let report = Pipeline::new(&config).run(&[], vec![]);
        assert!(report.verdicts.is_empty());
        assert!(!report.any_triggered());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.summary.average_complexity, 0.0);
    }

    #[test]
    fn test_recommendations_for_regressions() {
        let config = config_with_baseline(&[("big.mdc", 1.0), ("small.mdc", 1.0)]);
        let big = "if\n".repeat(10);
        let docs = vec![
            Document::new("big.mdc", big),
            Document::new("small.mdc", "if\n"),
        ];
        let report = Pipeline::new(&config).run(&docs, vec![]);

        // 40 vs threshold 2 and 4 vs threshold 2
        assert!(report.recommendations[0].starts_with("CRITICAL: big.mdc"));
        assert!(report.recommendations[1].starts_with("CRITICAL: small.mdc"));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("splitting complex files")));
    }

    #[test]
    fn test_consolidate_after_many_semantic_warnings() {
        let config = ProjectConfig::default();
        let docs: Vec<Document> = (0..3)
            .map(|i| Document::new(format!("{}.mdc", i), "x"))
            .collect();
        let provider = StubProvider(r#"{"complexity_rating": 9, "cursor_compatibility": 2}"#);
        let report = Pipeline::new(&config)
            .with_semantic(semantic(provider))
            .run(&docs, vec![]);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("consolidating")));
    }
}
