//! Apertus tool call parser.
//!
//! Parses tool calls in the Apertus single-key object format:
//! ```text
//! <|tools_prefix|>[{"get_weather": {"city": "NYC"}}]<|tools_suffix|>
//! ```
//!
//! Each array element is an object with exactly one key: the function name,
//! whose value is the arguments.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};

const TOOLS_PREFIX: &str = "<|tools_prefix|>";
const TOOLS_SUFFIX: &str = "<|tools_suffix|>";

/// Parser for Apertus-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct ApertusToolParser;

impl ApertusToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for ApertusToolParser {
    fn name(&self) -> &'static str {
        "apertus"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(start) = output.find(TOOLS_PREFIX) else {
            return Ok(Vec::new());
        };

        let after = &output[start + TOOLS_PREFIX.len()..];
        let body = match after.find(TOOLS_SUFFIX) {
            Some(end) => &after[..end],
            None => after,
        };

        let Some(array) = find_json_arrays(body).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let Some(obj) = entry.as_object() else {
                continue;
            };
            // Exactly one key: the function name.
            if obj.len() != 1 {
                tracing::warn!("Apertus entry must have exactly one key, got {}", obj.len());
                continue;
            }
            if let Some((name, args)) = obj.iter().next() {
                if name.is_empty() {
                    continue;
                }
                calls.push(ToolCall::new(name.clone(), normalize_arguments(args)));
            }
        }

        Ok(calls)
    }
}
