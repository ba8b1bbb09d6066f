//! JSON fallback tool call parser.
//!
//! Some models ignore the XML instructions and answer with an OpenAI-shaped
//! payload directly:
//! ```json
//! {"tool_calls": [{"id": "abc", "function": {"name": "f", "arguments": "{}"}}]}
//! ```
//!
//! Every top-level JSON object in the reply is inspected for a `tool_calls`
//! array. Supplied ids are preserved; `arguments` may be an object or a
//! JSON-encoded string.

use super::{find_json_objects, normalize_arguments, ToolCall, ToolCallParser};
use serde_json::Value;

/// Parser for raw JSON `tool_calls` payloads.
#[derive(Debug, Clone, Default)]
pub struct JsonToolParser;

impl JsonToolParser {
    pub fn new() -> Self {
        Self
    }
}

/// Extract calls from one `{..., "tool_calls": [...]}` payload object.
/// Shared with the Markdown fence parser.
pub(super) fn calls_from_payload(payload: &Value) -> Vec<ToolCall> {
    let Some(entries) = payload.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut calls = Vec::new();
    for entry in entries {
        let Some(function) = entry.get("function") else {
            continue;
        };
        let Some(name) = function.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let arguments = function
            .get("arguments")
            .map(normalize_arguments)
            .unwrap_or_else(|| "{}".to_string());

        let id = entry.get("id").and_then(Value::as_str).unwrap_or("");
        let call = if id.is_empty() {
            ToolCall::new(name, arguments)
        } else {
            ToolCall::with_id(id, name, arguments)
        };
        calls.push(call);
    }

    calls
}

impl ToolCallParser for JsonToolParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains("\"tool_calls\"") {
            return Ok(Vec::new());
        }

        for candidate in find_json_objects(output) {
            let Ok(payload) = serde_json::from_str::<Value>(candidate) else {
                continue;
            };
            let calls = calls_from_payload(&payload);
            if !calls.is_empty() {
                return Ok(calls);
            }
        }

        Ok(Vec::new())
    }
}
