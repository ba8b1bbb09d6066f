//! Llama 3.x tool call parser.
//!
//! Llama 3.x emits bare JSON objects, often embedded in prose:
//! ```text
//! Sure, let me look that up. {"type": "function", "name": "get_weather",
//! "parameters": {"city": "NYC"}}
//! ```
//!
//! Candidate objects are located with a brace-balanced scan that respects
//! string quoting and backslash escapes, so braces inside argument strings
//! do not break the extraction.

use super::{find_json_objects, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

/// Parser for Llama 3.x-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct LlamaToolParser;

#[derive(Debug, Deserialize)]
struct LlamaToolCallJson {
    #[serde(rename = "type")]
    call_type: String,
    name: String,
    #[serde(default)]
    parameters: Option<serde_json::Value>,
    #[serde(default)]
    arguments: Option<serde_json::Value>,
}

impl LlamaToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for LlamaToolParser {
    fn name(&self) -> &'static str {
        "llama"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("\"type\"") || !output.contains("\"name\"") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for candidate in find_json_objects(output) {
            let Ok(parsed) = serde_json::from_str::<LlamaToolCallJson>(candidate) else {
                continue;
            };

            if parsed.call_type != "function" || parsed.name.is_empty() {
                continue;
            }

            let args = parsed
                .parameters
                .or(parsed.arguments)
                .unwrap_or(serde_json::Value::Null);
            calls.push(ToolCall::new(parsed.name, normalize_arguments(&args)));
        }

        Ok(calls)
    }
}
