//! Project-level configuration support
//!
//! Loads the run configuration from `rulegauge.toml` or `.rulegaugerc.json`
//! in the analysed root. The configuration is read once at startup,
//! validated, and then passed by reference into the analyzers.
//!
//! # Configuration Format
//!
//! ```toml
//! # rulegauge.toml
//! threshold_multiplier = 2.0
//!
//! [baseline]
//! "workflow-level4.mdc" = 80
//! "main-optimized.mdc" = 60
//!
//! [weights]
//! diagram = 5.0
//! conditional = 4.0
//!
//! [size]
//! per_kb = 0.1
//! soft_limit_kb = 16.0
//!
//! [thresholds]
//! semantic_complexity = 7
//! min_compatibility = 5
//!
//! [semantic]
//! backend = "openai"
//! pacing_ms = 500
//! timeout_secs = 60
//! ```

use crate::models::{FindingKind, DEFAULT_HIGH_COMPLEXITY_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;


/// File names searched for, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["rulegauge.toml", ".rulegaugerc.json"];

/// Errors that make a run meaningless; all of them are fatal
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration found in {dir} (expected rulegauge.toml or .rulegaugerc.json, run `rulegauge init` to create one)")]
    NotFound { dir: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("missing [baseline] table: every run needs a baseline, even an empty one")]
    MissingBaseline,

    #[error("invalid config entry `{entry}`: {reason}")]
    Invalid { entry: String, reason: String },
}

fn invalid(entry: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        entry: entry.into(),
        reason: reason.into(),
    }
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Factor applied to a baseline before a score counts as a regression
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,

    /// Accepted static score per document identifier
    #[serde(default)]
    pub baseline: Option<BTreeMap<String, f64>>,

    #[serde(default)]
    pub weights: IndicatorWeights,

    #[serde(default)]
    pub size: SizeConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            threshold_multiplier: default_threshold_multiplier(),
            baseline: Some(BTreeMap::new()),
            weights: IndicatorWeights::default(),
            size: SizeConfig::default(),
            thresholds: ThresholdConfig::default(),
            semantic: SemanticConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

fn default_threshold_multiplier() -> f64 {
    2.0
}

impl ProjectConfig {
    /// Check every entry, naming the first malformed one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_multiplier(self.threshold_multiplier)?;

        let baseline = self.baseline.as_ref().ok_or(ConfigError::MissingBaseline)?;
        for (id, score) in baseline {
            if id.trim().is_empty() {
                return Err(invalid("baseline", "identifiers must not be empty"));
            }
            if !score.is_finite() || *score < 0.0 {
                return Err(invalid(
                    format!("baseline.\"{}\"", id),
                    format!("expected a non-negative number, got {}", score),
                ));
            }
        }

        self.validate_scoring()?;
        self.thresholds.validate()?;
        self.semantic.validate()?;
        Ok(())
    }

    /// Validate only what the static analyzer reads
    pub fn validate_scoring(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.size.validate()
    }

    /// Baseline table; empty when the config was never validated
    pub fn baseline_table(&self) -> BTreeMap<String, f64> {
        self.baseline.clone().unwrap_or_default()
    }
}

/// Validate a threshold multiplier, from config or the command line
pub fn validate_multiplier(multiplier: f64) -> Result<(), ConfigError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(invalid(
            "threshold_multiplier",
            format!("expected a positive number, got {}", multiplier),
        ));
    }
    Ok(())
}

/// Weight per structural indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeights {
    #[serde(default = "default_diagram_weight")]
    pub diagram: f64,

    #[serde(default = "default_code_block_weight")]
    pub code_block: f64,

    /// Applied per level of nesting below the top header
    #[serde(default = "default_nested_header_weight")]
    pub nested_header: f64,

    #[serde(default = "default_conditional_weight")]
    pub conditional: f64,

    #[serde(default = "default_workflow_step_weight")]
    pub workflow_step: f64,
}

impl Default for IndicatorWeights {
    fn default() -> Self {
        Self {
            diagram: default_diagram_weight(),
            code_block: default_code_block_weight(),
            nested_header: default_nested_header_weight(),
            conditional: default_conditional_weight(),
            workflow_step: default_workflow_step_weight(),
        }
    }
}

fn default_diagram_weight() -> f64 {
    5.0
}
fn default_code_block_weight() -> f64 {
    2.0
}
fn default_nested_header_weight() -> f64 {
    3.0
}
fn default_conditional_weight() -> f64 {
    4.0
}
fn default_workflow_step_weight() -> f64 {
    2.0
}

impl IndicatorWeights {
    /// Weight for an indicator kind. `Size` is governed by [`SizeConfig`].
    pub fn weight(&self, kind: FindingKind) -> f64 {
        match kind {
            FindingKind::Diagram => self.diagram,
            FindingKind::CodeBlock => self.code_block,
            FindingKind::NestedHeader => self.nested_header,
            FindingKind::Conditional => self.conditional,
            FindingKind::WorkflowStep => self.workflow_step,
            FindingKind::Size => 0.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            ("weights.diagram", self.diagram),
            ("weights.code_block", self.code_block),
            ("weights.nested_header", self.nested_header),
            ("weights.conditional", self.conditional),
            ("weights.workflow_step", self.workflow_step),
        ];
        for (entry, value) in entries {
            check_non_negative(entry, value)?;
        }
        Ok(())
    }
}

/// Piecewise-linear size contribution
///
/// ```text
/// size = per_kb × min(kb, soft_limit_kb)
///      + over_limit_per_kb × max(kb − soft_limit_kb, 0)
///      + per_line × lines
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    #[serde(default = "default_per_kb")]
    pub per_kb: f64,

    #[serde(default = "default_soft_limit_kb")]
    pub soft_limit_kb: f64,

    #[serde(default = "default_over_limit_per_kb")]
    pub over_limit_per_kb: f64,

    #[serde(default)]
    pub per_line: f64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            per_kb: default_per_kb(),
            soft_limit_kb: default_soft_limit_kb(),
            over_limit_per_kb: default_over_limit_per_kb(),
            per_line: 0.0,
        }
    }
}

fn default_per_kb() -> f64 {
    0.1
}
fn default_soft_limit_kb() -> f64 {
    16.0
}
fn default_over_limit_per_kb() -> f64 {
    0.5
}

impl SizeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("size.per_kb", self.per_kb)?;
        check_non_negative("size.soft_limit_kb", self.soft_limit_kb)?;
        check_non_negative("size.over_limit_per_kb", self.over_limit_per_kb)?;
        check_non_negative("size.per_line", self.per_line)?;
        Ok(())
    }
}

/// Limits used by the threshold evaluator and the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Semantic complexity above this triggers (default: 7)
    #[serde(default = "default_semantic_complexity")]
    pub semantic_complexity: u8,

    /// Compatibility below this triggers (default: 5)
    #[serde(default = "default_min_compatibility")]
    pub min_compatibility: u8,

    /// Static score above which a document is listed as high complexity
    #[serde(default = "default_high_complexity_score")]
    pub high_complexity_score: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            semantic_complexity: default_semantic_complexity(),
            min_compatibility: default_min_compatibility(),
            high_complexity_score: default_high_complexity_score(),
        }
    }
}

fn default_semantic_complexity() -> u8 {
    7
}
fn default_min_compatibility() -> u8 {
    5
}
fn default_high_complexity_score() -> f64 {
    DEFAULT_HIGH_COMPLEXITY_SCORE
}

impl ThresholdConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.semantic_complexity) {
            return Err(invalid(
                "thresholds.semantic_complexity",
                format!("expected 1-10, got {}", self.semantic_complexity),
            ));
        }
        if !(1..=10).contains(&self.min_compatibility) {
            return Err(invalid(
                "thresholds.min_compatibility",
                format!("expected 1-10, got {}", self.min_compatibility),
            ));
        }
        check_non_negative("thresholds.high_complexity_score", self.high_complexity_score)
    }
}

/// Language-model rating settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// openai, anthropic, deepinfra, openrouter or ollama
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Model override (default: backend's default model)
    #[serde(default)]
    pub model: Option<String>,

    /// Pause between successive rating calls
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Document text sent to the model is cut to this many characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_backend(),
            model: None,
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
            max_chars: default_max_chars(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_backend() -> String {
    "openai".to_string()
}
fn default_pacing_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_chars() -> usize {
    3000
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.3
}

impl SemanticConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.backend
            .parse::<crate::ai::LlmBackend>()
            .map_err(|e| invalid("semantic.backend", e.to_string()))?;
        if self.timeout_secs == 0 {
            return Err(invalid("semantic.timeout_secs", "must be at least 1"));
        }
        if self.max_chars == 0 {
            return Err(invalid("semantic.max_chars", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid(
                "semantic.temperature",
                format!("expected 0.0-2.0, got {}", self.temperature),
            ));
        }
        Ok(())
    }
}

/// Which files the CLI picks up as documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Path prefixes (relative to the root) to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "mdc".to_string()]
}

fn check_non_negative(entry: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            entry,
            format!("expected a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

/// Find and load the configuration for `root`, then validate it.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    for name in CONFIG_FILE_NAMES {
        let path = root.join(name);
        if path.is_file() {
            return load_config_file(&path);
        }
    }
    Err(ConfigError::NotFound {
        dir: root.to_path_buf(),
    })
}

/// Load and validate a specific configuration file.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let config = parse_config_file(path)?;
    config.validate()?;
    debug!(
        "Loaded config from {} ({} baseline entries)",
        path.display(),
        config.baseline.as_ref().map_or(0, |b| b.len())
    );
    Ok(config)
}

/// Load a config file for static scoring only.
///
/// The baseline table and semantic settings are not needed, so only the
/// weights and the size function are validated.
pub fn load_scoring_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let config = parse_config_file(path)?;
    config.validate_scoring()?;
    debug!("Loaded scoring config from {}", path.display());
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let config: ProjectConfig = if is_json {
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };
    Ok(config)
}
