//! Fenced diagram extraction
//!
//! Generators frequently return the diagram embedded in the reply text as a
//! ```` ```mermaid ```` code fence instead of filling the dedicated field.
//! This module splits such replies: the fenced description is pulled out and
//! the surrounding prose is kept as the displayable text.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```mermaid\n(.*?)\n?```").unwrap());

/// Split the first fenced diagram block out of `text`.
///
/// Returns `(diagram, cleaned_text)`: the fence body (if any) and the text
/// with the fence removed and surrounding whitespace trimmed. Text without a
/// fence is returned unchanged apart from trimming.
pub fn split_fenced_diagram(text: &str) -> (Option<String>, String) {
    match FENCE_PATTERN.captures(text) {
        Some(caps) => {
            let diagram = caps.get(1).map(|m| m.as_str().to_string());
            let cleaned = FENCE_PATTERN.replace(text, "").trim().to_string();
            (diagram, cleaned)
        }
        None => (None, text.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_passes_through() {
        let (diagram, text) = split_fenced_diagram("Just an explanation.");
        assert!(diagram.is_none());
        assert_eq!(text, "Just an explanation.");
    }

    #[test]
    fn test_extracts_fence_and_strips_it() {
        let input = "Here is the tree:\n```mermaid\ngraph TD;\n  A-->B\n```\nEach node holds a key.";
        let (diagram, text) = split_fenced_diagram(input);
        assert_eq!(diagram.as_deref(), Some("graph TD;\n  A-->B"));
        assert_eq!(text, "Here is the tree:\n\nEach node holds a key.");
    }

    #[test]
    fn test_fence_only_reply_leaves_empty_text() {
        let input = "```mermaid\ngraph TD; A-->B\n```";
        let (diagram, text) = split_fenced_diagram(input);
        assert_eq!(diagram.as_deref(), Some("graph TD; A-->B"));
        assert_eq!(text, "");
    }

    #[test]
    fn test_other_fences_are_not_diagrams() {
        let input = "Example:\n```rust\nfn main() {}\n```";
        let (diagram, text) = split_fenced_diagram(input);
        assert!(diagram.is_none());
        assert_eq!(text, input);
    }

    #[test]
    fn test_only_first_fence_is_taken() {
        let input = "```mermaid\ngraph TD; A-->B\n```\nand\n```mermaid\ngraph TD; C-->D\n```";
        let (diagram, text) = split_fenced_diagram(input);
        assert_eq!(diagram.as_deref(), Some("graph TD; A-->B"));
        // Only the matched fence is removed; later fences stay in the text.
        assert!(text.contains("C-->D"));
    }
}
