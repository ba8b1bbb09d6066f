//! Qwen3-Coder tool call parser.
//!
//! Parses tool calls in the Qwen3-Coder XML format:
//! ```text
//! <tool_call>
//! <function>get_weather</function>
//! <parameter>city=NYC</parameter>
//! <parameter>limit=10</parameter>
//! </tool_call>
//! ```
//!
//! Parameters are split on the first `=`; values are re-parsed as JSON
//! where possible, otherwise kept as strings.

use super::{ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

/// `<tool_call>...</tool_call>` blocks, tolerant of a lost close tag.
static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<tool_call>(.*?)(?:</tool_call>|$)")
        .expect("TOOL_CALL_REGEX pattern is invalid")
});

static FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<function>(.*?)</function>").expect("FUNCTION_REGEX pattern is invalid")
});

static PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<parameter>(.*?)</parameter>").expect("PARAMETER_REGEX pattern is invalid")
});

/// Parser for Qwen3-Coder-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct Qwen3CoderToolParser;

/// Function names are identifiers; anything else in the tag is another
/// dialect's payload.
fn is_identifier(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Qwen3CoderToolParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_block(body: &str) -> Option<ToolCall> {
        let name = FUNCTION_REGEX.captures(body)?.get(1)?.as_str().trim();
        if name.is_empty() || !is_identifier(name) {
            return None;
        }

        let mut params = serde_json::Map::new();
        for cap in PARAMETER_REGEX.captures_iter(body) {
            let raw = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let Some((key, value)) = raw.split_once('=') else {
                tracing::warn!("Qwen3-Coder parameter without '=': {raw}");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = value.trim();
            let json_value = serde_json::from_str::<serde_json::Value>(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            params.insert(key.to_string(), json_value);
        }

        let arguments = serde_json::to_string(&serde_json::Value::Object(params))
            .unwrap_or_else(|_| "{}".to_string());
        Some(ToolCall::new(name, arguments))
    }
}

impl ToolCallParser for Qwen3CoderToolParser {
    fn name(&self) -> &'static str {
        "qwen3coder"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<function>") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let body = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            if let Some(call) = Self::parse_block(body) {
                calls.push(call);
            }
        }

        Ok(calls)
    }
}
