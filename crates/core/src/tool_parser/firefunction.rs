//! Firefunction v2 tool call parser.
//!
//! Parses tool calls in the Fireworks Firefunction format:
//! ```text
//!  functools[{"name": "get_weather", "arguments": {"city": "NYC"}}]
//! ```
//!
//! The marker is the literal ` functools` with a significant leading space,
//! immediately followed by a JSON array.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const FUNCTOOLS_MARKER: &str = " functools";

/// Parser for Firefunction v2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct FirefunctionToolParser;

#[derive(Debug, Deserialize)]
struct FirefunctionToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl FirefunctionToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for FirefunctionToolParser {
    fn name(&self) -> &'static str {
        "firefunction"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(marker) = output.find(FUNCTOOLS_MARKER) else {
            return Ok(Vec::new());
        };

        let after = output[marker + FUNCTOOLS_MARKER.len()..].trim_start();
        if !after.starts_with('[') {
            return Ok(Vec::new());
        }
        let Some(array) = find_json_arrays(after).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: FirefunctionToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Firefunction tool call: {e}");
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
