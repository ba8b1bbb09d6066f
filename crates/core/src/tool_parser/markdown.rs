//! Markdown-fenced JSON tool call parser.
//!
//! Chat-tuned models love to wrap their JSON in a code fence:
//! ````text
//! ```json
//! {"tool_calls": [{"function": {"name": "f", "arguments": "{}"}}]}
//! ```
//! ````
//!
//! Each fenced block is unwrapped and handed to the same payload extraction
//! as the plain JSON fallback.

use super::json_parser::calls_from_payload;
use super::{ToolCall, ToolCallParser};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static CODE_FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*([^`]+)```").expect("CODE_FENCE_REGEX pattern is invalid")
});

/// Parser for Markdown-fenced JSON `tool_calls` payloads.
#[derive(Debug, Clone, Default)]
pub struct MarkdownJsonToolParser;

impl MarkdownJsonToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for MarkdownJsonToolParser {
    fn name(&self) -> &'static str {
        "markdown_json"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("```") {
            return Ok(Vec::new());
        }

        for cap in CODE_FENCE_REGEX.captures_iter(output) {
            let fenced = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let Ok(payload) = serde_json::from_str::<Value>(fenced) else {
                continue;
            };
            let calls = calls_from_payload(&payload);
            if !calls.is_empty() {
                return Ok(calls);
            }
        }

        Ok(Vec::new())
    }
}
