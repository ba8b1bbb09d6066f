//! LFM2 tool call parser.
//!
//! Parses tool calls in the Liquid LFM2 format:
//! ```text
//! <|tool_call_start|>[{"name": "get_weather", "arguments": {"city": "NYC"}}]<|tool_call_end|>
//! ```

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const TOOL_CALL_START: &str = "<|tool_call_start|>";
const TOOL_CALL_END: &str = "<|tool_call_end|>";

/// Parser for LFM2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct Lfm2ToolParser;

#[derive(Debug, Deserialize)]
struct Lfm2ToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl Lfm2ToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for Lfm2ToolParser {
    fn name(&self) -> &'static str {
        "lfm2"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(start) = output.find(TOOL_CALL_START) else {
            return Ok(Vec::new());
        };

        let after = &output[start + TOOL_CALL_START.len()..];
        let body = match after.find(TOOL_CALL_END) {
            Some(end) => &after[..end],
            None => after,
        };

        let Some(array) = find_json_arrays(body).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: Lfm2ToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed LFM2 tool call: {e}");
                    continue;
                }
            };

            if parsed.name.is_empty() {
                continue;
            }

            calls.push(ToolCall::new(
                parsed.name,
                normalize_arguments(&parsed.arguments),
            ));
        }

        Ok(calls)
    }
}
