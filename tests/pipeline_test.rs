//! Library-level pipeline tests
//!
//! Drive the full decision pipeline through the public API with stub rating
//! providers: configuration loading, scoring, rating, thresholds and the
//! record/alert split.

use rulegauge::ai::{AiError, AiResult, RatingProvider, SemanticAnalyzer};
use rulegauge::config::{load_project_config, ProjectConfig};
use rulegauge::detectors::StaticAnalyzer;
use rulegauge::models::{Document, DocumentFailure};
use rulegauge::pipeline::Pipeline;
use rulegauge::reporters::{alert_with_format, report_with_format, OutputFormat};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Returns a fixed reply and records every document it was asked about
struct RecordingProvider {
    reply: String,
    seen: Rc<RefCell<Vec<String>>>,
}

impl RatingProvider for RecordingProvider {
    fn rate(&self, text: &str, _instructions: &str) -> AiResult<String> {
        let first = text.lines().next().unwrap_or_default().to_string();
        self.seen.borrow_mut().push(first);
        Ok(self.reply.clone())
    }
}

/// Fails only for documents whose message mentions `fail_on`
struct FlakyProvider {
    fail_on: &'static str,
    reply: &'static str,
}

impl FlakyProvider {
    fn new(fail_on: &'static str) -> Self {
        Self {
            fail_on,
            reply: r#"{"complexity_rating": 3, "cursor_compatibility": 9}"#,
        }
    }
}

impl RatingProvider for FlakyProvider {
    fn rate(&self, text: &str, _instructions: &str) -> AiResult<String> {
        if text.contains(self.fail_on) {
            Err(AiError::ApiError {
                status: 429,
                message: "rate limited".to_string(),
            })
        } else {
            Ok(self.reply.to_string())
        }
    }
}

fn config(toml_src: &str) -> ProjectConfig {
    let config: ProjectConfig = toml::from_str(toml_src).expect("parse config");
    config.validate().expect("valid config");
    config
}

fn corpus(n: usize, hot: &[usize]) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let body = if hot.contains(&i) {
                "if a\nelse b\nunless c\n"
            } else {
                "plain text\n"
            };
            Document::new(format!("rules/doc{}.mdc", i), format!("# Doc {}\n\n{}", i, body))
        })
        .collect()
}

#[test]
fn test_n_documents_m_triggered() {
    let baselines: String = (0..10)
        .map(|i| format!("\"doc{}.mdc\" = 1.0\n", i))
        .collect();
    let config = config(&format!("[baseline]\n{}", baselines));
    let docs = corpus(10, &[2, 5, 7]);

    let report = Pipeline::new(&config).run(&docs, vec![]);

    assert_eq!(report.verdicts.len(), 10);
    assert_eq!(report.alert_subset().verdicts.len(), 3);
    let triggered: Vec<&str> = report.triggered().map(|v| v.document.as_str()).collect();
    assert_eq!(
        triggered,
        vec!["rules/doc2.mdc", "rules/doc5.mdc", "rules/doc7.mdc"]
    );

    let full: serde_json::Value =
        serde_json::from_str(&report_with_format(&report, OutputFormat::Json).expect("render"))
            .expect("json");
    let alert: serde_json::Value =
        serde_json::from_str(&alert_with_format(&report, OutputFormat::Json).expect("render"))
            .expect("json");
    assert_eq!(full["verdicts"].as_array().expect("array").len(), 10);
    assert_eq!(alert["verdicts"].as_array().expect("array").len(), 3);
}

#[test]
fn test_semantic_rating_reaches_every_document_in_order() {
    let config = ProjectConfig::default();
    let docs = corpus(3, &[]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let provider = RecordingProvider {
        reply: r#"{"complexity_rating": 8, "cursor_compatibility": 5, "violations": ["uses JOIN"]}"#
            .to_string(),
        seen: seen.clone(),
    };

    let analyzer = SemanticAnalyzer::new(Box::new(provider), Duration::ZERO, 3000);
    let report = Pipeline::new(&config)
        .with_semantic(analyzer)
        .run(&docs, vec![]);

    assert_eq!(
        *seen.borrow(),
        vec![
            "File: rules/doc0.mdc",
            "File: rules/doc1.mdc",
            "File: rules/doc2.mdc"
        ]
    );
    for verdict in &report.verdicts {
        let rules: Vec<&str> = verdict.reasons.iter().map(|r| r.rule()).collect();
        // compatibility 5 sits on the floor and does not fire
        assert_eq!(rules, vec!["semantic_complexity", "violations"]);
    }
}

#[test]
fn test_one_semantic_failure_does_not_affect_others() {
    let config = config("[baseline]\n\"doc1.mdc\" = 0.5\n");
    let docs = corpus(3, &[1]);
    let analyzer = SemanticAnalyzer::new(
        Box::new(FlakyProvider::new("doc1.mdc")),
        Duration::ZERO,
        3000,
    );

    let report = Pipeline::new(&config)
        .with_semantic(analyzer)
        .run(&docs, vec![]);

    assert_eq!(report.verdicts.len(), 3);
    assert!(report.verdicts[0].semantic.is_some());
    assert!(report.verdicts[2].semantic.is_some());

    let failed = &report.verdicts[1];
    assert!(failed.semantic.is_none());
    assert!(failed.triggered);
    assert_eq!(failed.reasons[0].rule(), "static_regression");
    assert_eq!(report.semantic_failures.len(), 1);
    assert_eq!(report.semantic_failures[0].document, "rules/doc1.mdc");
}

#[test]
fn test_alert_never_names_untriggered_documents() {
    let config = ProjectConfig::default();
    // no baseline and no rating, but well above the high-complexity mark
    let calm = Document::new("rules/calm.mdc", "if\n".repeat(20));
    let hot = Document::new("rules/hot.mdc", "# Hot\n");
    let provider = FlakyProvider {
        fail_on: "calm.mdc",
        reply: r#"{"complexity_rating": 9, "cursor_compatibility": 8}"#,
    };
    let analyzer = SemanticAnalyzer::new(Box::new(provider), Duration::ZERO, 3000);
    let failures = vec![DocumentFailure {
        document: "rules/broken.mdc".to_string(),
        error: "not valid UTF-8".to_string(),
    }];

    let report = Pipeline::new(&config)
        .with_semantic(analyzer)
        .run(&[calm, hot], failures);

    // the full record still covers everything
    assert_eq!(report.summary.high_complexity, vec!["rules/calm.mdc"]);
    assert_eq!(report.semantic_failures[0].document, "rules/calm.mdc");

    let alert = report.alert_subset();
    assert_eq!(alert.verdicts.len(), 1);
    assert!(alert.semantic_failures.is_empty());
    assert!(alert.failures.is_empty());
    assert!(alert.summary.high_complexity.is_empty());
    assert_eq!(alert.summary.documents_analyzed, 1);

    for format in [OutputFormat::Json, OutputFormat::Text, OutputFormat::Markdown] {
        let out = alert_with_format(&report, format).expect("render");
        assert!(out.contains("rules/hot.mdc"), "{} alert misses hot.mdc", format);
        assert!(!out.contains("calm.mdc"), "{} alert names calm.mdc", format);
        assert!(!out.contains("broken.mdc"), "{} alert names broken.mdc", format);
    }
}

#[test]
fn test_high_complexity_listed_by_score() {
    let config = ProjectConfig::default();
    let docs = vec![
        Document::new("a.mdc", "if\n".repeat(15)),
        Document::new("b.mdc", "if\n".repeat(30)),
        Document::new("c.mdc", "if\n".repeat(20)),
    ];
    let report = Pipeline::new(&config).run(&docs, vec![]);
    assert_eq!(report.summary.high_complexity, vec!["b.mdc", "c.mdc", "a.mdc"]);

    let md = report_with_format(&report, OutputFormat::Markdown).expect("render");
    let b = md.find("`b.mdc`").expect("b listed");
    let c = md.find("`c.mdc`").expect("c listed");
    let a = md.find("`a.mdc`").expect("a listed");
    assert!(b < c && c < a);
}

#[test]
fn test_baseline_examples() {
    let config = config("[baseline]\n\"a.mdc\" = 40\n");
    let analyzer = StaticAnalyzer::new(&config.weights, &config.size);

    // 20 conditionals at weight 4 give 80 plus a size contribution > 0
    let over = Document::new("a.mdc", "if\n".repeat(20));
    let score = analyzer.analyze(&over);
    assert!(score.total > 80.0);

    let report = Pipeline::new(&config).run(&[over], vec![]);
    assert_eq!(report.verdicts[0].reasons[0].rule(), "static_regression");

    let unknown = Document::new("b.mdc", "if\n".repeat(250));
    let report = Pipeline::new(&config).run(&[unknown], vec![]);
    assert!(report.verdicts[0].static_score.total >= 1000.0);
    assert!(!report.verdicts[0].triggered);
}

#[test]
fn test_static_analysis_is_deterministic() {
    let config = ProjectConfig::default();
    let analyzer = StaticAnalyzer::new(&config.weights, &config.size);
    let text = "# Rules\n## Flow\n```mermaid\ngraph TD\n```\n1. Plan\n2. Build\nif blocked, stop\n";
    let a = analyzer.analyze(&Document::new("x.mdc", text));
    let b = analyzer.analyze(&Document::new("x.mdc", text));
    assert_eq!(a, b);
    let sum: f64 = a.findings.iter().map(|f| f.contribution).sum();
    assert_eq!(a.total, sum);
}

#[test]
fn test_load_project_config_from_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("rulegauge.toml"),
        "threshold_multiplier = 1.5\n[baseline]\n\"main.mdc\" = 60\n",
    )
    .expect("write");

    let config = load_project_config(dir.path()).expect("load");
    let doc = Document::new(".cursor/rules/main.mdc", "# M\n");
    let report = Pipeline::new(&config).run(&[doc], vec![]);
    assert_eq!(report.threshold_multiplier, 1.5);
    assert_eq!(report.verdicts[0].baseline, Some(60.0));
    assert!(!report.any_triggered());
}

#[test]
fn test_markdown_summary_for_empty_run() {
    let config = ProjectConfig::default();
    let report = Pipeline::new(&config).run(&[], vec![]);
    let md = report_with_format(&report, OutputFormat::Markdown).expect("render");
    assert!(md.contains("NO ISSUES"));
}
