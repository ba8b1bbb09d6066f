//! Xiaomi MiMo tool call parser.
//!
//! Parses tool calls in MiMo's inline key=value shape:
//! ```text
//! <tool_call>name=get_weather, arguments={"city": "NYC"}</tool_call>
//! ```

use super::{find_json_objects, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

/// `name=...` up to the comma, then everything up to the close tag (or
/// end-of-string) as the arguments region.
static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<tool_call>\s*name\s*=\s*([^,]+?)\s*,\s*arguments\s*=\s*(.*?)(?:</tool_call>|$)")
        .expect("TOOL_CALL_REGEX pattern is invalid")
});

/// Parser for Xiaomi MiMo-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct MimoToolParser;

impl MimoToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for MimoToolParser {
    fn name(&self) -> &'static str {
        "mimo"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("<tool_call>") {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let name = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let args_region = cap.get(2).map(|m| m.as_str()).unwrap_or("");

            if name.is_empty() {
                continue;
            }

            let arguments = find_json_objects(args_region)
                .into_iter()
                .next()
                .filter(|candidate| {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_tool_call() {
        let parser = MimoToolParser::new();
        let output = r#"<tool_call>name=get_weather, arguments={"city": "NYC"}</tool_call>"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["city"], "NYC");
    }

    #[test]
    fn parse_multiple_tool_calls() {
        let parser = MimoToolParser::new();
        let output = "<tool_call>name=a, arguments={}</tool_call>\n\
            <tool_call>name=b, arguments={\"x\": 1}</tool_call>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function.name, "a");
        assert_eq!(calls[1].function.name, "b");
    }

    #[test]
    fn nested_arguments_object() {
        let parser = MimoToolParser::new();
        let output =
            r#"<tool_call>name=f, arguments={"cfg": {"deep": true}, "n": 2}</tool_call>"#;

        let calls = parser.parse(output).unwrap();
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["cfg"]["deep"], true);
        assert_eq!(args["n"], 2);
    }

    #[test]
    fn missing_close_tag_reads_to_end_of_string() {
        let parser = MimoToolParser::new();
        let output = r#"<tool_call>name=f, arguments={"x": 1}"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.arguments, r#"{"x": 1}"#);
    }

    #[test]
    fn unparseable_arguments_default_to_object() {
        let parser = MimoToolParser::new();
        let output = "<tool_call>name=f, arguments=oops</tool_call>";

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.arguments, "{}");
    }

    #[test]
    fn hermes_payload_not_matched() {
        let parser = MimoToolParser::new();
        let output = r#"<tool_call>{"name": "f", "arguments": {}}</tool_call>"#;

        assert!(parser.parse(output).unwrap().is_empty());
    }

    #[test]
    fn no_markers_returns_empty() {
        let parser = MimoToolParser::new();
        assert!(parser.parse("plain text").unwrap().is_empty());
    }
}
