//! Threshold evaluator
//!
//! Merges a static score, an optional semantic rating and a baseline into a
//! verdict. Every rule is evaluated independently and in a fixed order:
//!
//! 1. static regression: `score > baseline × multiplier` (skipped without a baseline)
//! 2. semantic complexity: `complexity > limit`
//! 3. compatibility: `compatibility < floor`
//! 4. conflicts: static or semantic conflict labels present
//! 5. violations: static or semantic violation labels present

use crate::config::ProjectConfig;
use crate::models::{SemanticRating, StaticScore, TriggerReason, Verdict};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEvaluator {
    multiplier: f64,
    complexity_limit: u8,
    compatibility_floor: u8,
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(2.0, 7, 5)
    }
}

impl ThresholdEvaluator {
    pub fn new(multiplier: f64, complexity_limit: u8, compatibility_floor: u8) -> Self {
        Self {
            multiplier,
            complexity_limit,
            compatibility_floor,
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(
            config.threshold_multiplier,
            config.thresholds.semantic_complexity,
            config.thresholds.min_compatibility,
        )
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn evaluate(
        &self,
        score: StaticScore,
        rating: Option<SemanticRating>,
        baseline: Option<f64>,
    ) -> Verdict {
        let mut reasons = Vec::new();

        if let Some(reason) = baseline.and_then(|b| self.static_regression(score.total, b)) {
            reasons.push(reason);
        }

        if let Some(rating) = &rating {
            if let Some(complexity) = rating.complexity.filter(|c| *c > self.complexity_limit) {
                reasons.push(TriggerReason::SemanticComplexity {
                    rating: complexity,
                    limit: self.complexity_limit,
                });
            }
            if let Some(compat) = rating.compatibility.filter(|c| *c < self.compatibility_floor) {
                reasons.push(TriggerReason::Compatibility {
                    rating: compat,
                    floor: self.compatibility_floor,
                });
            }
        }

        let conflicts = merge_labels(&score.conflicts, rating.as_ref().map(|r| &r.conflicts));
        if !conflicts.is_empty() {
            reasons.push(TriggerReason::Conflicts {
                count: conflicts.len(),
                labels: conflicts,
            });
        }

        let violations = merge_labels(&score.violations, rating.as_ref().map(|r| &r.violations));
        if !violations.is_empty() {
            reasons.push(TriggerReason::Violations {
                count: violations.len(),
                labels: violations,
            });
        }

        if !reasons.is_empty() {
            debug!(
                "{}: triggered by {}",
                score.document,
                reasons.iter().map(|r| r.rule()).collect::<Vec<_>>().join(", ")
            );
        }

        Verdict::new(score, rating, baseline, reasons)
    }

    fn static_regression(&self, current: f64, baseline: f64) -> Option<TriggerReason> {
        let threshold = baseline * self.multiplier;
        if current <= threshold {
            return None;
        }
        let excess_percentage = if threshold > 0.0 {
            (current - threshold) / threshold * 100.0
        } else {
            100.0
        };
        Some(TriggerReason::StaticRegression {
            current,
            baseline,
            threshold,
            excess_percentage,
        })
    }
}

/// Static labels first, then semantic ones not already present
fn merge_labels(static_labels: &[String], semantic: Option<&Vec<String>>) -> Vec<String> {
    let mut merged = static_labels.to_vec();
    for label in semantic.into_iter().flatten() {
        if !merged.contains(label) {
            merged.push(label.clone());
        }
    }
    merged
}
