//! Nemotron v2 tool call parser.
//!
//! Parses tool calls in the NVIDIA Nemotron format:
//! ```text
//! <TOOLCALL>[{"name": "get_weather", "arguments": {"city": "NYC"}}]</TOOLCALL>
//! ```

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const TOOLCALL_OPEN: &str = "<TOOLCALL>";
const TOOLCALL_CLOSE: &str = "</TOOLCALL>";

/// Parser for Nemotron v2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct NemotronToolParser;

#[derive(Debug, Deserialize)]
struct NemotronToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl NemotronToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for NemotronToolParser {
    fn name(&self) -> &'static str {
        "nemotron"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(start) = output.find(TOOLCALL_OPEN) else {
            return Ok(Vec::new());
        };

        let after = &output[start + TOOLCALL_OPEN.len()..];
        let body = match after.find(TOOLCALL_CLOSE) {
            Some(end) => &after[..end],
            None => after,
        };

        let Some(array) = find_json_arrays(body).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: NemotronToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Nemotron tool call: {e}");
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
