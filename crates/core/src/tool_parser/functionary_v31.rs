//! Functionary v3.1 (Llama 3.1 template) tool call parser.
//!
//! Parses tool calls in the MeetKai Functionary v3.1 tag format:
//! ```text
//! <function=get_weather>{"city": "NYC"}</function>
//! ```

use super::{find_json_objects, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

static FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<function=([^>]+)>(.*?)(?:</function>|$)")
        .expect("FUNCTION_REGEX pattern is invalid")
});

/// Parser for Functionary v3.1-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct FunctionaryV31ToolParser;

impl FunctionaryV31ToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for FunctionaryV31ToolParser {
    fn name(&self) -> &'static str {
        "functionary_v31"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<function=") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in FUNCTION_REGEX.captures_iter(output) {
            let name = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let body = cap.get(2).map(|m| m.as_str()).unwrap_or("");

            if name.is_empty() {
                continue;
            }

            let arguments = find_json_objects(body)
                .into_iter()
                .find(|candidate| {
                    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(candidate)
                        .is_ok()
                })
                .unwrap_or("{}")
                .to_string();

            calls.push(ToolCall::new(name, arguments));
        }

        Ok(calls)
    }
}
