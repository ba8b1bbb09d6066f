//! Magistral tool call parser.
//!
//! Parses tool calls in the Mistral Magistral format:
//! ```text
//! [TOOLCALLS][{"name": "get_weather", "arguments": {"city": "NYC"}}]
//! ```
//!
//! Like Mistral Nemo but with an unbroken `[TOOLCALLS]` token and no call
//! ids in the payload.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const TOOLCALLS_TOKEN: &str = "[TOOLCALLS]";

/// Parser for Magistral-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct MagistralToolParser;

#[derive(Debug, Deserialize)]
struct MagistralToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl MagistralToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for MagistralToolParser {
    fn name(&self) -> &'static str {
        "magistral"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(token) = output.find(TOOLCALLS_TOKEN) else {
            return Ok(Vec::new());
        };

        let after = &output[token + TOOLCALLS_TOKEN.len()..];
        let Some(array) = find_json_arrays(after).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: MagistralToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Magistral tool call: {e}");
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
