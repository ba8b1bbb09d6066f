//! Generic tool call parser, the last resort of the cascade.
//!
//! Accepts any JSON object exposing a `tool_calls`/`toolcalls` array or a
//! `tool_call`/`toolcall` object, with flexible field names for the function
//! name (`name`, `function`, `function_name`, `tool`, `tool_name`) and the
//! arguments (`arguments`, `args`, `parameters`, `params`, `input`).
//!
//! This parser is dangerously broad, which is why it runs dead last and
//! refuses payloads whose top level carries a `response` field: those are
//! free-form model answers, not tool invocations.

use super::{find_json_objects, normalize_arguments, ToolCall, ToolCallParser};
use serde_json::Value;

const NAME_KEYS: &[&str] = &["name", "function", "function_name", "tool", "tool_name"];
const ARGUMENT_KEYS: &[&str] = &["arguments", "args", "parameters", "params", "input"];

/// Parser for loosely OpenAI-shaped tool call payloads.
#[derive(Debug, Clone, Default)]
pub struct GenericToolParser;

impl GenericToolParser {
    pub fn new() -> Self {
        Self
    }
}

/// Function name via the flexible key set. A `function` key holding an
/// object is recursed into.
fn flexible_name(entry: &Value) -> Option<String> {
    for key in NAME_KEYS {
        match entry.get(key) {
            Some(Value::String(name)) if !name.is_empty() => return Some(name.clone()),
            Some(Value::Object(_)) if *key == "function" => {
                if let Some(name) = entry.get("function").and_then(flexible_name_ref) {
                    return Some(name);
                }
            }
            _ => {}
        }
    }
    None
}

fn flexible_name_ref(nested: &Value) -> Option<String> {
    for key in NAME_KEYS {
        if let Some(Value::String(name)) = nested.get(key) {
            if !name.is_empty() {
                return Some(name.clone());
            }
        }
    }
    None
}

/// Arguments via the flexible key set, checking a nested `function` object
/// as well. Defaults to the empty object.
fn flexible_arguments(entry: &Value) -> String {
    for key in ARGUMENT_KEYS {
        if let Some(args) = entry.get(key) {
            return normalize_arguments(args);
        }
    }
    if let Some(nested @ Value::Object(_)) = entry.get("function") {
        for key in ARGUMENT_KEYS {
            if let Some(args) = nested.get(key) {
                return normalize_arguments(args);
            }
        }
    }
    "{}".to_string()
}

fn call_from_entry(entry: &Value) -> Option<ToolCall> {
    let name = flexible_name(entry)?;
    let arguments = flexible_arguments(entry);
    let id = entry.get("id").and_then(Value::as_str).unwrap_or("");
    Some(if id.is_empty() {
        ToolCall::new(name, arguments)
    } else {
        ToolCall::with_id(id, name, arguments)
    })
}

fn calls_from_object(payload: &Value) -> Vec<ToolCall> {
    // A top-level `response` field marks free-form content.
    if payload.get("response").is_some() {
        return Vec::new();
    }

    for key in ["tool_calls", "toolcalls"] {
        if let Some(entries) = payload.get(key).and_then(Value::as_array) {
            return entries.iter().filter_map(call_from_entry).collect();
        }
    }

    for key in ["tool_call", "toolcall"] {
        if let Some(entry) = payload.get(key) {
            if entry.is_object() {
                return call_from_entry(entry).into_iter().collect();
            }
        }
    }

    Vec::new()
}

impl ToolCallParser for GenericToolParser {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        for candidate in find_json_objects(output) {
            let Ok(payload) = serde_json::from_str::<Value>(candidate) else {
                continue;
            };
            let calls = calls_from_object(&payload);
            if !calls.is_empty() {
                return Ok(calls);
            }
        }

        Ok(Vec::new())
    }
}
