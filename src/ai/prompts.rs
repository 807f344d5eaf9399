//! Prompt templates for semantic rating
//!
//! One call covers rule conflicts, best-practice violations and tooling
//! compatibility, and asks for a single JSON object back.

use crate::models::Document;

/// Builds the system instructions and user message for one document
pub struct RatingPrompt;

impl RatingPrompt {
    /// Instructions sent as the system prompt
    pub fn instructions() -> &'static str {
        r#"You review rule documents that configure an AI coding assistant (Cursor rules, memory-bank workflows).
Rate the document you are given and report problems.

Look for:
1. Contradictory instructions, or mandatory rules that conflict with each other
2. Rule hierarchies or dependencies between rule files that could confuse users
3. Code examples that break common best practices (SQL joins, naming, deprecated patterns)
4. Rules too large or complex for the assistant's context window
5. Instructions that assume features the assistant does not have

Reply with one JSON object and nothing else:
{"complexity_rating": <1-10>, "cursor_compatibility": <1-10>, "conflicts": ["..."], "violations": ["..."], "issues": ["..."]}

complexity_rating: 1 is trivial, 10 is unmanageable.
cursor_compatibility: 1 will not work in the assistant, 10 works as written.
Use empty lists when nothing applies."#
    }

    /// User message carrying the (truncated) document
    pub fn user_message(document: &Document, max_chars: usize) -> String {
        let content = truncate_chars(document.content(), max_chars);
        let marker = if content.len() < document.content().len() {
            "\n[... truncated]"
        } else {
            ""
        };
        format!(
            "File: {}\nLines: {}\n\n<document>\n{}{}\n</document>",
            document.id(),
            document.line_count(),
            content,
            marker
        )
    }
}

/// First `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("🎼🎼🎼", 1), "🎼");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_user_message_marks_truncation() {
        let doc = Document::new("rules/a.mdc", "x".repeat(50));
        let full = RatingPrompt::user_message(&doc, 100);
        assert!(full.contains("File: rules/a.mdc"));
        assert!(!full.contains("truncated"));

        let cut = RatingPrompt::user_message(&doc, 10);
        assert!(cut.contains("[... truncated]"));
        assert!(!cut.contains(&"x".repeat(11)));
    }

    #[test]
    fn test_instructions_request_json() {
        let text = RatingPrompt::instructions();
        assert!(text.contains("complexity_rating"));
        assert!(text.contains("cursor_compatibility"));
    }
}
