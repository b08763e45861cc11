//! Turning unstructured model output into follow-up task specs.
//!
//! No particular natural-language strategy is mandated; any implementation
//! satisfies the contract as long as it is pure, maps non-actionable input to
//! an empty list, and preserves order (creation order fixes the synthesized
//! child ids).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::CodeContext;

/// A follow-up task derived from a model response, before it becomes a full
/// task in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildTaskSpec {
    pub description: String,
    #[serde(default)]
    pub context: Vec<CodeContext>,
}

impl ChildTaskSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<CodeContext>) -> Self {
        self.context = context;
        self
    }
}

/// Contract for deriving child task specs from raw model output.
///
/// # Requirements
/// - Pure: identical input yields identical output
/// - Empty or non-actionable input yields an empty vec
/// - Output order determines child creation order
pub trait ResponseParser: Send + Sync {
    fn parse(&self, raw: &str) -> Vec<ChildTaskSpec>;
}

/// Matches one bulleted (`-`, `*`) or numbered (`1.`, `2)`) list item.
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*]|\d+[.)])\s+(.+?)\s*$").expect("valid list-item regex")
});

/// Parser that reads each list item of the response as one task description.
///
/// Models asked to "break this down" or "suggest fixes" answer in list form
/// reliably enough that this needs no secondary model call. Prose without list
/// items parses to nothing, which the agents report as non-actionable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListResponseParser;

impl ResponseParser for ListResponseParser {
    fn parse(&self, raw: &str) -> Vec<ChildTaskSpec> {
        LIST_ITEM
            .captures_iter(raw)
            .map(|caps| ChildTaskSpec::new(&caps[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_and_bulleted_items_parse_in_order() {
        let parser = ListResponseParser;
        let raw = "Plan:\n1. Define the schema\n2) Wire the store\n- Add tests\n* Ship it\n";
        let specs = parser.parse(raw);
        let descriptions: Vec<&str> = specs.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            descriptions,
            ["Define the schema", "Wire the store", "Add tests", "Ship it"]
        );
    }

    #[test]
    fn prose_without_items_is_non_actionable() {
        let parser = ListResponseParser;
        assert!(parser.parse("Looks good to me, nothing to change.").is_empty());
        assert!(parser.parse("").is_empty());
    }

    #[test]
    fn parse_is_pure() {
        let parser = ListResponseParser;
        let raw = "- one\n- two";
        assert_eq!(parser.parse(raw), parser.parse(raw));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let parser = ListResponseParser;
        let specs = parser.parse("  1.   Tighten error handling   \n");
        assert_eq!(specs[0].description, "Tighten error handling");
    }
}
