//! Apriel 1.5 tool call parser.
//!
//! Parses tool calls in the ServiceNow Apriel tag-pair format:
//! ```text
//! <tool_calls>
//! <name>get_weather</name>, <arguments>{"city": "NYC"}</arguments>
//! <name>get_time</name>, <arguments>{"tz": "EST"}</arguments>
//! </tool_calls>
//! ```

use super::{normalize_arguments, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

static TOOL_CALLS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<tool_calls>(.*?)(?:</tool_calls>|$)")
        .expect("TOOL_CALLS_REGEX pattern is invalid")
});

/// `<name>...</name>` optionally followed by a comma, then
/// `<arguments>...</arguments>` (end-of-string closes a truncated pair).
static CALL_PAIR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<name>(.*?)</name>\s*,?\s*<arguments>(.*?)(?:</arguments>|$)")
        .expect("CALL_PAIR_REGEX pattern is invalid")
});

/// Parser for Apriel 1.5-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct AprielToolParser;

impl AprielToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for AprielToolParser {
    fn name(&self) -> &'static str {
        "apriel"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<tool_calls>") || !output.contains("<name>") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for block in TOOL_CALLS_REGEX.captures_iter(output) {
            let body = block.get(1).map(|m| m.as_str()).unwrap_or("");

            for pair in CALL_PAIR_REGEX.captures_iter(body) {
                let name = pair.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let args = pair.get(2).map(|m| m.as_str().trim()).unwrap_or("");

                if name.is_empty() {
                    continue;
                }

                let arguments =
                    normalize_arguments(&serde_json::Value::String(args.to_string()));
                calls.push(ToolCall::new(name, arguments));
            }
        }

        Ok(calls)
    }
}
