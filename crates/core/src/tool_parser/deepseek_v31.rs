//! DeepSeek V3.1 tool call parser.
//!
//! Parses tool calls delimited by DeepSeek's Unicode special tokens:
//! ```text
//! <｜tool▁calls▁begin｜>
//! <｜tool▁call▁begin｜>function_name<｜tool▁sep｜>{"arg": "val"}<｜tool▁call▁end｜>
//! <｜tool▁calls▁end｜>
//! ```
//!
//! The delimiters use full-width characters (`｜` = U+FF5C, `▁` = U+2581);
//! they are matched as ordinary substrings, never as ASCII. Several spellings
//! of the outer begin token circulate in the wild and are all accepted. A
//! truncated reply that lost its end tokens still yields the parsed calls.

use super::{normalize_arguments, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

const TOOL_CALL_BEGIN: &str = "<｜tool\u{2581}call\u{2581}begin｜>";

/// Outer begin-token spellings seen across DeepSeek checkpoints.
const TOOL_CALLS_BEGIN_VARIANTS: &[&str] = &[
    "<｜tool\u{2581}calls\u{2581}begin｜>",
    "<｜tool_calls_begin｜>",
    "<｜tool calls begin｜>",
    "<|tool\u{2581}calls\u{2581}begin|>",
];

/// `<｜tool▁call▁begin｜>name<｜tool▁sep｜>args<｜tool▁call▁end｜>`,
/// end-of-string standing in for a lost end token.
static TOOL_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "(?s)<｜tool\u{2581}call\u{2581}begin｜>(?P<name>.*?)<｜tool\u{2581}sep｜>(?P<args>.*?)(?:<｜tool\u{2581}call\u{2581}end｜>|$)",
    )
    .expect("TOOL_CALL_REGEX pattern is invalid")
});

/// Parser for DeepSeek V3.1 tool calls.
#[derive(Debug, Clone, Default)]
pub struct DeepSeekV31ToolParser;

impl DeepSeekV31ToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for DeepSeekV31ToolParser {
    fn name(&self) -> &'static str {
        "deepseek_v31"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let has_outer = TOOL_CALLS_BEGIN_VARIANTS.iter().any(|v| output.contains(v));
        if !has_outer && !output.contains(TOOL_CALL_BEGIN) {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in TOOL_CALL_REGEX.captures_iter(output) {
            let name = cap.name("name").map(|m| m.as_str().trim()).unwrap_or("");
            let args = cap.name("args").map(|m| m.as_str().trim()).unwrap_or("");

            if name.is_empty() {
                continue;
            }

            let arguments = normalize_arguments(&serde_json::Value::String(args.to_string()));
            calls.push(ToolCall::new(name, arguments));
        }

        Ok(calls)
    }
}
