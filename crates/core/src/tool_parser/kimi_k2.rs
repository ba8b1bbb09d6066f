//! Kimi K2 tool call parser.
//!
//! Parses tool calls in the Moonshot Kimi K2 sectioned-token format:
//! ```text
//! <|tool_calls_section_begin|>
//! <|tool_call_begin|>functions.get_weather:0<|tool_call_argument_begin|>{"city": "NYC"}<|tool_call_end|>
//! <|tool_calls_section_end|>
//! ```
//!
//! The slot between the begin tokens is either a bare function name or a
//! call id of the form `functions.name:index`; the name is the part after
//! the last `.` and before the `:`.

use super::{normalize_arguments, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

const TOOL_CALL_BEGIN: &str = "<|tool_call_begin|>";

static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<\|tool_call_begin\|>\s*(?P<id>.*?)\s*<\|tool_call_argument_begin\|>\s*(?P<args>.*?)\s*(?:<\|tool_call_end\|>|$)",
    )
    .expect("TOOL_CALL_REGEX pattern is invalid")
});

/// Parser for Kimi K2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct KimiK2ToolParser;

impl KimiK2ToolParser {
    pub fn new() -> Self {
        Self
    }

    /// Function name from a call slot like `functions.get_weather:0`.
    fn extract_function_name(slot: &str) -> &str {
        let before_colon = slot.split(':').next().unwrap_or(slot);
        before_colon.rsplit('.').next().unwrap_or(before_colon)
    }
}

impl ToolCallParser for KimiK2ToolParser {
    fn name(&self) -> &'static str {
        "kimi_k2"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains(TOOL_CALL_BEGIN) {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let slot = cap.name("id").map(|m| m.as_str().trim()).unwrap_or("");
            let args = cap.name("args").map(|m| m.as_str().trim()).unwrap_or("");

            let name = Self::extract_function_name(slot);
            if name.is_empty() {
                continue;
            }

            let arguments = normalize_arguments(&serde_json::Value::String(args.to_string()));
            calls.push(ToolCall::new(name, arguments));
        }

        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_tool_call() {
        let parser = KimiK2ToolParser::new();
        let output = "<|tool_calls_section_begin|><|tool_call_begin|>functions.get_weather:0<|tool_call_argument_begin|>{\"city\": \"NYC\"}<|tool_call_end|><|tool_calls_section_end|>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["city"], "NYC");
    }

    #[test]
    fn parse_multiple_tool_calls() {
        let parser = KimiK2ToolParser::new();
        let output = "<|tool_calls_section_begin|>\
            <|tool_call_begin|>functions.get_weather:0<|tool_call_argument_begin|>{\"city\": \"NYC\"}<|tool_call_end|>\
            <|tool_call_begin|>functions.get_time:1<|tool_call_argument_begin|>{\"tz\": \"EST\"}<|tool_call_end|>\
            <|tool_calls_section_end|>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(calls[1].function.name, "get_time");
    }

    #[test]
    fn bare_name_slot_accepted() {
        let parser = KimiK2ToolParser::new();
        let output = "<|tool_call_begin|>get_weather<|tool_call_argument_begin|>{}<|tool_call_end|>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls[0].function.name, "get_weather");
    }

    #[test]
    fn missing_end_token_reads_to_end_of_string() {
        let parser = KimiK2ToolParser::new();
        let output = "<|tool_call_begin|>f:0<|tool_call_argument_begin|>{\"x\": 1}";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.arguments, "{\"x\": 1}");
    }

    #[test]
    fn empty_arguments_default_to_object() {
        let parser = KimiK2ToolParser::new();
        let output = "<|tool_call_begin|>f<|tool_call_argument_begin|><|tool_call_end|>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls[0].function.arguments, "{}");
    }

    #[test]
    fn no_markers_returns_empty() {
        let parser = KimiK2ToolParser::new();
        assert!(parser.parse("plain text").unwrap().is_empty());
    }
}
