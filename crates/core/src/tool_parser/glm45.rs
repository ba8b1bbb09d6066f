//! GLM 4.5 tool call parser.
//!
//! Parses tool calls in the GLM 4.5 key/value tag format:
//! ```text
//! <tool_call>
//! <arg_key>get_weather</arg_key>
//! <arg_value>{"city": "Beijing"}</arg_value>
//! <arg_key>date</arg_key>
//! <arg_value>2025-08-01</arg_value>
//! </tool_call>
//! ```
//!
//! The first key/value pair names the function: its key is the function name
//! and its value, when it re-parses as a JSON object, seeds the arguments.
//! Every remaining pair is an argument; values are re-parsed as JSON where
//! possible and kept as strings otherwise.

use super::{ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

/// Complete `<tool_call>...</tool_call>` blocks, end-of-string closing an
/// unterminated block.
static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<tool_call>(.*?)(?:</tool_call>|$)")
        .expect("TOOL_CALL_REGEX pattern is invalid")
});

/// Individual `<arg_key>...</arg_key> <arg_value>...</arg_value>` pairs.
static ARG_PAIR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<arg_key>(.*?)</arg_key>\s*<arg_value>(.*?)</arg_value>")
        .expect("ARG_PAIR_REGEX pattern is invalid")
});

/// Parser for GLM 4.5-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct Glm45ToolParser;

impl Glm45ToolParser {
    pub fn new() -> Self {
        Self
    }
}

/// JSON literal if it parses, string otherwise.
fn reparse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

impl ToolCallParser for Glm45ToolParser {
    fn name(&self) -> &'static str {
        "glm45"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<arg_key>") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for block in TOOL_CALL_REGEX.captures_iter(output) {
            let body = block.get(1).map(|m| m.as_str()).unwrap_or("");

            let mut pairs = ARG_PAIR_REGEX.captures_iter(body);
            let Some(head) = pairs.next() else {
                continue;
            };

            let name = head.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if name.is_empty() {
                tracing::warn!("GLM 4.5 tool call with empty function name, skipping");
                continue;
            }

            let mut args = serde_json::Map::new();
            // The head pair's value seeds the arguments when it is itself
            // a JSON object; a scalar head value carries no arguments.
            let head_value = head.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            if let Ok(serde_json::Value::Object(seed)) =
                serde_json::from_str::<serde_json::Value>(head_value)
            {
                args.extend(seed);
            }

            for pair in pairs {
                let key = pair.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let value = pair.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                if key.is_empty() {
                    continue;
                }
                args.insert(key.to_string(), reparse_value(value));
            }

            let arguments = serde_json::to_string(&serde_json::Value::Object(args))
                .unwrap_or_else(|_| "{}".to_string());
            calls.push(ToolCall::new(name, arguments));
        }

        Ok(calls)
    }
}
