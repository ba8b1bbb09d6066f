//! Command R7B tool call parser.
//!
//! Cohere's Command R7B emits an action block containing a JSON array:
//! ```text
//! <|START_ACTION|>[
//!   {"tool_name": "get_weather", "tool_call_id": "0", "parameters": {"city": "NYC"}}
//! ]<|END_ACTION|>
//! ```
//!
//! `tool_call_id` is optional; when present it is preserved on the emitted
//! call instead of a freshly generated id.

use super::{find_json_arrays, normalize_arguments, ToolCall, ToolCallParser};
use serde::Deserialize;

const START_ACTION: &str = "<|START_ACTION|>";
const END_ACTION: &str = "<|END_ACTION|>";

/// Parser for Command R7B action blocks.
#[derive(Debug, Clone, Default)]
pub struct CommandR7bToolParser;

#[derive(Debug, Deserialize)]
struct CommandR7bAction {
    tool_name: String,
    #[serde(default)]
    tool_call_id: Option<String>,
    #[serde(default)]
    parameters: serde_json::Value,
}

impl CommandR7bToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for CommandR7bToolParser {
    fn name(&self) -> &'static str {
        "command_r7b"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(start) = output.find(START_ACTION) else {
            return Ok(Vec::new());
        };

        // Everything between the first start marker and the first end
        // marker after it; end-of-string if the end marker never arrives.
        let after = &output[start + START_ACTION.len()..];
        let body = match after.find(END_ACTION) {
            Some(end) => &after[..end],
            None => after,
        };

        let Some(array) = find_json_arrays(body).into_iter().next() else {
            return Ok(Vec::new());
        };

        let actions: Vec<serde_json::Value> = serde_json::from_str(array)?;
        let mut calls = Vec::new();
        for action in actions {
            let parsed: CommandR7bAction = match serde_json::from_value(action) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("skipping malformed Command R7B action: {e}");
                    continue;
                }
            };

            if parsed.tool_name.is_empty() {
                continue;
            }

            let arguments = normalize_arguments(&parsed.parameters);
            let call = match parsed.tool_call_id {
                Some(id) if !id.is_empty() => ToolCall::with_id(id, parsed.tool_name, arguments),
                _ => ToolCall::new(parsed.tool_name, arguments),
            };
            calls.push(call);
        }

        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_action() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[{"tool_name": "get_weather", "parameters": {"city": "NYC"}}]<|END_ACTION|>"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        assert!(calls[0].id.starts_with("call_"));
    }

    #[test]
    fn supplied_tool_call_id_preserved() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[{"tool_name": "f", "tool_call_id": "tc_9", "parameters": {}}]<|END_ACTION|>"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls[0].id, "tc_9");
    }

    #[test]
    fn parse_multiple_actions_in_order() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[
            {"tool_name": "first", "parameters": {"a": 1}},
            {"tool_name": "second", "parameters": {"b": 2}}
        ]<|END_ACTION|>"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function.name, "first");
        assert_eq!(calls[1].function.name, "second");
    }

    #[test]
    fn missing_end_marker_reads_to_end_of_string() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[{"tool_name": "f", "parameters": {}}]"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn malformed_entry_skipped() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[{"not_a_tool": true}, {"tool_name": "ok", "parameters": {}}]<|END_ACTION|>"#;

        let calls = parser.parse(output).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "ok");
    }

    #[test]
    fn no_markers_returns_empty() {
        let parser = CommandR7bToolParser::new();
        assert!(parser.parse("no actions here").unwrap().is_empty());
    }

    #[test]
    fn string_parameters_accepted() {
        let parser = CommandR7bToolParser::new();
        let output = r#"<|START_ACTION|>[{"tool_name": "f", "parameters": "{\"x\": 1}"}]<|END_ACTION|>"#;

        let calls = parser.parse(output).unwrap();
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["x"], 1);
    }
}
