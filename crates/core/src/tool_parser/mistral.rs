//! Mistral Nemo tool call parser.
//!
//! Parses tool calls in the Mistral `[TOOL_CALLS]` format:
//! ```text
//! [TOOL_CALLS][{"name": "get_weather", "arguments": {"city": "NYC"}, "id": "abc"}]
//! ```
//!
//! The payload is a JSON array of `{name, arguments}` objects; an optional
//! `id` per entry is preserved on the emitted call.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const TOOL_CALLS_TOKEN: &str = "[TOOL_CALLS]";

/// Parser for Mistral Nemo-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct MistralToolParser;

#[derive(Debug, Deserialize)]
struct MistralToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
    #[serde(default)]
    id: Option<String>,
}

impl MistralToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for MistralToolParser {
    fn name(&self) -> &'static str {
        "mistral"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(token) = output.find(TOOL_CALLS_TOKEN) else {
            return Ok(Vec::new());
        };

        let after = &output[token + TOOL_CALLS_TOKEN.len()..];
        let Some(array) = find_json_arrays(after).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: MistralToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Mistral tool call: {e}");
                    continue;
                }
            };

            if parsed.name.is_empty() {
                continue;
            }

            let arguments = normalize_arguments(&parsed.arguments);
            let call = match parsed.id {
                Some(id) if !id.is_empty() => ToolCall::with_id(id, parsed.name, arguments),
                _ => ToolCall::new(parsed.name, arguments),
            };
            calls.push(call);
        }

        Ok(calls)
    }
}
