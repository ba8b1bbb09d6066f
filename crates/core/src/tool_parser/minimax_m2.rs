//! MiniMax-M2 tool call parser.
//!
//! Parses tool calls in the MiniMax invoke/parameter XML format:
//! ```text
//! <minimax:tool_call>
//! <invoke name="get_weather">
//! <parameter name="city">NYC</parameter>
//! </invoke>
//! </minimax:tool_call>
//! ```
//!
//! Parameter values are re-parsed as JSON where possible (numbers, booleans,
//! arrays), otherwise kept as strings.

use super::{ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<minimax:tool_call>(.*?)(?:</minimax:tool_call>|$)")
        .expect("TOOL_CALL_REGEX pattern is invalid")
});

static INVOKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<invoke\s+name="([^"]+)">(.*?)(?:</invoke>|$)"#)
        .expect("INVOKE_REGEX pattern is invalid")
});

static PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<parameter\s+name="([^"]+)">(.*?)</parameter>"#)
        .expect("PARAMETER_REGEX pattern is invalid")
});

/// Parser for MiniMax-M2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct MinimaxM2ToolParser;

impl MinimaxM2ToolParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_block(block: &str) -> Vec<ToolCall> {
        let mut calls = Vec::new();

        for invoke in INVOKE_REGEX.captures_iter(block) {
            let name = invoke.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let body = invoke.get(2).map(|m| m.as_str()).unwrap_or("");

            if name.is_empty() {
                continue;
            }

            let mut params = serde_json::Map::new();
            for param in PARAMETER_REGEX.captures_iter(body) {
                let key = param.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let value = param.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                if key.is_empty() {
                    continue;
                }
                let json_value = serde_json::from_str::<serde_json::Value>(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                params.insert(key.to_string(), json_value);
            }

            let arguments = serde_json::to_string(&serde_json::Value::Object(params))
                .unwrap_or_else(|_| "{}".to_string());
            calls.push(ToolCall::new(name, arguments));
        }

        calls
    }
}

impl ToolCallParser for MinimaxM2ToolParser {
    fn name(&self) -> &'static str {
        "minimax_m2"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<minimax:tool_call>") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let block = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            calls.extend(Self::parse_block(block));
        }

        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_tool_call() {
        let parser = MinimaxM2ToolParser::new();
        let output = "<minimax:tool_call>\n<invoke name=\"get_weather\">\n<parameter name=\"city\">NYC</parameter>\n</invoke>\n</minimax:tool_call>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["city"], "NYC");
    }

    #[test]
    fn parse_multiple_invokes_in_one_block() {
        let parser = MinimaxM2ToolParser::new();
        let output = "<minimax:tool_call>\
            <invoke name=\"a\"><parameter name=\"x\">1</parameter></invoke>\
            <invoke name=\"b\"><parameter name=\"y\">2</parameter></invoke>\
            </minimax:tool_call>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function.name, "a");
        assert_eq!(calls[1].function.name, "b");
    }

    #[test]
    fn values_reparsed_as_json() {
        let parser = MinimaxM2ToolParser::new();
        let output = "<minimax:tool_call><invoke name=\"f\">\
            <parameter name=\"count\">3</parameter>\
            <parameter name=\"deep\">true</parameter>\
            <parameter name=\"label\">hello world</parameter>\
            </invoke></minimax:tool_call>";

        let calls = parser.parse(output).unwrap();
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["count"], 3);
        assert_eq!(args["deep"], true);
        assert_eq!(args["label"], "hello world");
    }

    #[test]
    fn missing_close_tags_read_to_end_of_string() {
        let parser = MinimaxM2ToolParser::new();
        let output =
            "<minimax:tool_call><invoke name=\"f\"><parameter name=\"x\">1</parameter>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "f");
    }

    #[test]
    fn no_parameters_yields_empty_object() {
        let parser = MinimaxM2ToolParser::new();
        let output = "<minimax:tool_call><invoke name=\"ping\"></invoke></minimax:tool_call>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls[0].function.arguments, "{}");
    }

    #[test]
    fn emulation_format_not_matched() {
        // The gateway's own <function_calls> emulation format shares the
        // invoke/parameter grammar but not the wrapper.
        let parser = MinimaxM2ToolParser::new();
        let output = "<function_calls><invoke name=\"f\"></invoke></function_calls>";

        assert!(parser.parse(output).unwrap().is_empty());
    }

    #[test]
    fn no_markers_returns_empty() {
        let parser = MinimaxM2ToolParser::new();
        assert!(parser.parse("plain text").unwrap().is_empty());
    }
}
