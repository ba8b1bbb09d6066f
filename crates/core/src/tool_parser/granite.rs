//! Granite tool call parser.
//!
//! IBM Granite models emit a `<tool_call>` tag followed by a JSON array:
//! ```text
//! <tool_call>[{"name": "get_weather", "arguments": {"city": "NYC"}}]
//! ```
//!
//! `arguments` may arrive as an object or as a JSON-encoded string; both are
//! normalized to the canonical object-string form. Runs before the Hermes
//! umbrella so the array payload is not misread as a malformed JSON object.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const TOOL_CALL_TAG: &str = "<tool_call>";

/// Parser for Granite-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct GraniteToolParser;

#[derive(Debug, Deserialize)]
struct GraniteToolCallJson {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl GraniteToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for GraniteToolParser {
    fn name(&self) -> &'static str {
        "granite"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(tag) = output.find(TOOL_CALL_TAG) else {
            return Ok(Vec::new());
        };

        // The array must directly follow the tag; a later bracket belongs
        // to some other dialect's payload.
        let after = output[tag + TOOL_CALL_TAG.len()..].trim_start();
        if !after.starts_with('[') {
            return Ok(Vec::new());
        }
        let Some(array) = find_json_arrays(after).into_iter().next() else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for entry in entries {
            let parsed: GraniteToolCallJson = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Granite tool call: {e}");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_tool_call() {
        let parser = GraniteToolParser::new();
        let output = r#"<tool_call>[{"name": "get_weather", "arguments": {"city": "NYC"}}]"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["city"], "NYC");
    }

    #[test]
    fn parse_multiple_calls_in_one_array() {
        let parser = GraniteToolParser::new();
        let output = r#"<tool_call>[
            {"name": "get_weather", "arguments": {"city": "NYC"}},
            {"name": "get_time", "arguments": {"tz": "EST"}}
        ]"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].function.name, "get_time");
    }

    #[test]
    fn string_encoded_arguments_normalized() {
        let parser = GraniteToolParser::new();
        let output = r#"<tool_call>[{"name": "f", "arguments": "{\"x\": 1}"}]"#;

        let calls = parser.parse(output).unwrap();
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["x"], 1);
    }

    #[test]
    fn missing_arguments_default_to_object() {
        let parser = GraniteToolParser::new();
        let output = r#"<tool_call>[{"name": "get_time"}]"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls[0].function.arguments, "{}");
    }

    #[test]
    fn object_payload_is_not_granite() {
        // `<tool_call>{...}` is the Hermes shape, not an array; this parser
        // must return nothing so the cascade can hand it to Hermes.
        let parser = GraniteToolParser::new();
        let output = r#"<tool_call>{"name": "f", "arguments": {}}</tool_call>"#;

        assert!(parser.parse(output).unwrap().is_empty());
    }

    #[test]
    fn prose_around_block_tolerated() {
        let parser = GraniteToolParser::new();
        let output = "Calling now.\n<tool_call>[{\"name\": \"f\", \"arguments\": {}}]\nDone.";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn no_tag_returns_empty() {
        let parser = GraniteToolParser::new();
        assert!(parser.parse("plain text").unwrap().is_empty());
    }
}
