//! Hermes 2 Pro tool call parser.
//!
//! The most permissive tag dialect, used by NousResearch Hermes models and a
//! long tail of function-calling fine-tunes:
//! ```text
//! <tool_call>{"name": "get_weather", "arguments": {"city": "NYC"}}</tool_call>
//! ```
//!
//! Several opener spellings circulate (`<tool_call>`, `<toolcall>`,
//! `<function_call>`, `<functioncall>`, `<function>`); the close tag is
//! inferred from the opener and end-of-string closes a truncated block.
//! The payload is a JSON object naming the call via `name` or `function`,
//! optionally preceded by a `<name>...</name>` tag. Runs after the
//! narrower `<tool_call>` grammars (GLM 4.5, Qwen3-Coder, MiMo, Granite)
//! so it cannot steal their matches.

use super::{normalize_arguments, find_json_objects, ToolCall, ToolCallParser};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const OPENERS: &[&str] = &[
    "<tool_call>",
    "<toolcall>",
    "<function_call>",
    "<functioncall>",
    "<function>",
];

static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<(?:tool_call|toolcall|function_call|functioncall|function)>\s*(.*?)\s*(?:</(?:tool_call|toolcall|function_call|functioncall|function)>|$)",
    )
    .expect("BLOCK_REGEX pattern is invalid")
});

static NAME_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<name>(.*?)</name>").expect("NAME_TAG_REGEX pattern is invalid"));

/// Parser for Hermes-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct HermesToolParser;

impl HermesToolParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one block body into a call, or None when it is not Hermes-shaped.
    fn parse_block(body: &str) -> Option<ToolCall> {
        let tagged_name = NAME_TAG_REGEX
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|n| !n.is_empty());

        let payload = find_json_objects(body)
            .into_iter()
            .next()
            .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok());

        match (tagged_name, payload) {
            (Some(name), Some(obj)) => {
                // With an explicit <name> tag the JSON is either a bare
                // arguments object or a full envelope.
                let arguments = match envelope_arguments(&obj) {
                    Some(args) => args,
                    None => normalize_arguments(&obj),
                };
                Some(ToolCall::new(name, arguments))
            }
            (Some(name), None) => Some(ToolCall::new(name, "{}")),
            (None, Some(obj)) => {
                let name = envelope_name(&obj)?;
                let arguments = envelope_arguments(&obj).unwrap_or_else(|| "{}".to_string());
                Some(ToolCall::new(name, arguments))
            }
            (None, None) => None,
        }
    }
}

/// Function name from an envelope's `name` or `function` field.
fn envelope_name(obj: &Value) -> Option<String> {
    if let Some(name) = obj.get("name").and_then(Value::as_str) {
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    match obj.get("function") {
        Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
        Some(Value::Object(func)) => func
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Arguments from an envelope's `arguments`/`parameters`, or from a nested
/// `function` object. None when the payload carries no argument field.
fn envelope_arguments(obj: &Value) -> Option<String> {
    for key in ["arguments", "parameters"] {
        if let Some(args) = obj.get(key) {
            return Some(normalize_arguments(args));
        }
    }
    if let Some(Value::Object(func)) = obj.get("function") {
        for key in ["arguments", "parameters"] {
            if let Some(args) = func.get(key) {
                return Some(normalize_arguments(args));
            }
        }
    }
    None
}

impl ToolCallParser for HermesToolParser {
    fn name(&self) -> &'static str {
        "hermes"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !OPENERS.iter().any(|o| output.contains(o)) {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in BLOCK_REGEX.captures_iter(output) {
            let body = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            if let Some(call) = Self::parse_block(body) {
                calls.push(call);
            } else if !body.trim().is_empty() {
                tracing::debug!("Hermes-style block without a parseable payload, skipping");
            }
        }

        Ok(calls)
    }
}
