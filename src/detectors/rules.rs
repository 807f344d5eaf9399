//! Conflict and best-practice rules
//!
//! Pattern checks over the document text. They only produce labels; the
//! static score is never affected by them.

use regex::Regex;
use std::sync::OnceLock;

/// A text rule: occurrences of `pattern` minus occurrences of `except`
struct TextRule {
    pattern: &'static str,
    except: Option<&'static str>,
    label: &'static str,
}

const CONFLICT_RULES: &[TextRule] = &[
    TextRule {
        pattern: r"(?i)\bCRITICAL\b.*\bMANDATORY\b",
        except: None,
        label: "Mandatory rule complexity",
    },
    TextRule {
        pattern: r"(?i)\bMUST\b.*\bBEFORE\b",
        except: None,
        label: "Sequential dependency complexity",
    },
    TextRule {
        pattern: r"(?i)\bNO\b.*\bcontinue\b",
        except: None,
        label: "Blocking rule complexity",
    },
    TextRule {
        pattern: r"(?i)\bBLOCKED\b",
        except: None,
        label: "Blocking rule detected",
    },
    TextRule {
        pattern: r"(?i)\bREQUIRES\b.*\bMODE\b",
        except: None,
        label: "Mode dependency complexity",
    },
    TextRule {
        pattern: r"(?i)\bSWITCH\b.*\bMODE\b",
        except: None,
        label: "Mode transition complexity",
    },
];

const VIOLATION_RULES: &[TextRule] = &[
    TextRule {
        pattern: r"(?i)\bp\.\w+",
        except: None,
        label: "Avoid \"p.\" prefix for fields",
    },
    TextRule {
        pattern: r"(?i)\bimport\s+pandas\s+as\s+pd\b",
        except: None,
        label: "Avoid pandas aliasing",
    },
    TextRule {
        pattern: r"(?i)\bJOIN\b",
        except: Some(r"(?i)\b(?:LEFT|RIGHT|FULL|OUTER|CROSS)\s+JOIN\b"),
        label: "Prefer LEFT JOIN over simple JOIN",
    },
    TextRule {
        pattern: r"(?i)\bON\s+\w+\.\w+\s*=\s*\w+\.\w+",
        except: None,
        label: "Prefer USING() over ON for joins",
    },
    TextRule {
        pattern: r"(?i)\bpd\.\w",
        except: None,
        label: "Avoid pandas aliasing (pd.)",
    },
    TextRule {
        pattern: r"(?i)\bas\s+pd\b",
        except: None,
        label: "Avoid pandas aliasing (as pd)",
    },
];

struct CompiledRule {
    pattern: Regex,
    except: Option<Regex>,
    label: &'static str,
}

fn compile(rules: &[TextRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|r| CompiledRule {
            pattern: Regex::new(r.pattern).expect("valid regex"),
            except: r.except.map(|e| Regex::new(e).expect("valid regex")),
            label: r.label,
        })
        .collect()
}

static CONFLICTS: OnceLock<Vec<CompiledRule>> = OnceLock::new();
static VIOLATIONS: OnceLock<Vec<CompiledRule>> = OnceLock::new();

fn count_matches(regex: &Regex, text: &str) -> usize {
    text.lines().map(|line| regex.find_iter(line).count()).sum()
}

fn evaluate(rules: &[CompiledRule], text: &str) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| {
            let hits = count_matches(&rule.pattern, text);
            let excused = rule
                .except
                .as_ref()
                .map_or(0, |e| count_matches(e, text));
            let count = hits.saturating_sub(excused);
            (count > 0).then(|| format!("{}: {} instances", rule.label, count))
        })
        .collect()
}

/// Rule-conflict labels, in rule order
pub fn conflict_labels(text: &str) -> Vec<String> {
    evaluate(CONFLICTS.get_or_init(|| compile(CONFLICT_RULES)), text)
}

/// Best-practice violation labels, in rule order
pub fn violation_labels(text: &str) -> Vec<String> {
    evaluate(VIOLATIONS.get_or_init(|| compile(VIOLATION_RULES)), text)
}
