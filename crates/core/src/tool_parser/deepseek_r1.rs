//! DeepSeek R1 tool call parser.
//!
//! Same Unicode-token framing as DeepSeek V3.1, but the reasoning models use
//! a different separator between the function name and its arguments:
//! ```text
//! <｜tool▁call▁begin｜>name<｜function▁tool▁sep｜>{"arg": "val"}<｜tool▁call▁end｜>
//! ```
//!
//! R1 checkpoints occasionally emit a call with an empty name slot; those
//! entries are dropped.

use super::{normalize_arguments, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

const FUNCTION_SEP: &str = "<｜function\u{2581}tool\u{2581}sep｜>";

static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "(?s)<｜tool\u{2581}call\u{2581}begin｜>(?P<name>.*?)<｜function\u{2581}tool\u{2581}sep｜>(?P<args>.*?)(?:<｜tool\u{2581}call\u{2581}end｜>|$)",
    )
    .expect("TOOL_CALL_REGEX pattern is invalid")
});

/// Parser for DeepSeek R1 tool calls.
#[derive(Debug, Clone, Default)]
pub struct DeepSeekR1ToolParser;

impl DeepSeekR1ToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for DeepSeekR1ToolParser {
    fn name(&self) -> &'static str {
        "deepseek_r1"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains(FUNCTION_SEP) {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let name = cap.name("name").map(|m| m.as_str().trim()).unwrap_or("");
            let args = cap.name("args").map(|m| m.as_str().trim()).unwrap_or("");

            if name.is_empty() {
                tracing::debug!("dropping DeepSeek R1 tool call with empty name");
                continue;
            }

            let arguments = normalize_arguments(&serde_json::Value::String(args.to_string()));
            calls.push(ToolCall::new(name, arguments));
        }

        Ok(calls)
    }
}
