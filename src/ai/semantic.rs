//! Semantic analyzer
//!
//! Delegates rating to a [`RatingProvider`] and turns the reply into a
//! [`SemanticRating`]. A failed or unusable reply means "no rating" for that
//! document; it never stops the run.

use crate::ai::client::{AiClient, Message};
use crate::ai::prompts::RatingPrompt;
use crate::ai::{AiError, AiResult};
use crate::config::SemanticConfig;
use crate::models::{Document, SemanticRating};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;

/// External language-model capability
///
/// `text` is the user message, `instructions` the system prompt. Returns the
/// raw model reply.
pub trait RatingProvider {
    fn rate(&self, text: &str, instructions: &str) -> AiResult<String>;
}

impl RatingProvider for AiClient {
    fn rate(&self, text: &str, instructions: &str) -> AiResult<String> {
        self.generate(vec![Message::user(text)], Some(instructions))
    }
}

/// Enforces a minimum interval between successive calls
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Block until `interval` has passed since the previous call.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Rates documents one at a time through a provider
pub struct SemanticAnalyzer {
    provider: Box<dyn RatingProvider>,
    pacer: Pacer,
    max_chars: usize,
}

impl SemanticAnalyzer {
    pub fn new(provider: Box<dyn RatingProvider>, pacing: Duration, max_chars: usize) -> Self {
        Self {
            provider,
            pacer: Pacer::new(pacing),
            max_chars,
        }
    }

    pub fn from_config(provider: Box<dyn RatingProvider>, semantic: &SemanticConfig) -> Self {
        Self::new(
            provider,
            Duration::from_millis(semantic.pacing_ms),
            semantic.max_chars,
        )
    }

    /// Rate one document.
    ///
    /// An error means "no rating" for this document only; callers record it
    /// and carry on with the rest of the run.
    pub fn rate_document(&mut self, document: &Document) -> AiResult<SemanticRating> {
        self.pacer.wait();
        let message = RatingPrompt::user_message(document, self.max_chars);
        let reply = self.provider.rate(&message, RatingPrompt::instructions())?;
        let rating = parse_rating(document.id(), &reply)?;
        debug!(
            "{}: semantic complexity {:?}, compatibility {:?}",
            document.id(),
            rating.complexity,
            rating.compatibility
        );
        Ok(rating)
    }
}

const COMPLEXITY_KEYS: &[&str] = &["complexity_rating", "complexity"];
const COMPATIBILITY_KEYS: &[&str] = &[
    "cursor_compatibility",
    "compatibility",
    "compatibility_rating",
];
const CONFLICT_KEYS: &[&str] = &["conflicts", "rule_conflicts"];
const VIOLATION_KEYS: &[&str] = &["violations", "best_practice_violations"];
const ISSUE_KEYS: &[&str] = &["issues", "cursor_issues"];

/// Parse a model reply into a rating.
///
/// The first `{` .. last `}` span is read as JSON, so fenced or chatty
/// replies still parse. Ratings are rounded and clamped to 1..=10; a missing
/// or non-numeric rating is left as `None`. A reply without a JSON object, or
/// with none of the expected fields, is an error.
pub fn parse_rating(document: &str, reply: &str) -> AiResult<SemanticRating> {
    let (start, end) = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(AiError::ParseError(
                "no JSON object in model reply".to_string(),
            ))
        }
    };

    let value: Value = serde_json::from_str(&reply[start..=end])
        .map_err(|e| AiError::ParseError(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(AiError::ParseError("model reply is not an object".to_string()));
    };

    let known = [
        COMPLEXITY_KEYS,
        COMPATIBILITY_KEYS,
        CONFLICT_KEYS,
        VIOLATION_KEYS,
        ISSUE_KEYS,
    ];
    if !known.iter().flat_map(|keys| keys.iter()).any(|k| obj.contains_key(*k)) {
        return Err(AiError::ParseError(
            "model reply has none of the expected fields".to_string(),
        ));
    }

    Ok(SemanticRating {
        document: document.to_string(),
        complexity: first_field(&obj, COMPLEXITY_KEYS).and_then(rating_value),
        compatibility: first_field(&obj, COMPATIBILITY_KEYS).and_then(rating_value),
        conflicts: first_field(&obj, CONFLICT_KEYS).map(labels).unwrap_or_default(),
        violations: first_field(&obj, VIOLATION_KEYS).map(labels).unwrap_or_default(),
        issues: first_field(&obj, ISSUE_KEYS).map(labels).unwrap_or_default(),
    })
}

fn first_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

/// Number, or numeric string such as `"8"` or `"8/10"`, clamped to 1..=10
fn rating_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.split('/').next()?.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(1.0, 10.0) as u8)
}

fn labels(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            Value::Object(o) => o
                .get("description")
                .or_else(|| o.get("message"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}
