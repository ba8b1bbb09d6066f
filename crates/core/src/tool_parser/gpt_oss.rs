//! GPT-OSS tool call parser.
//!
//! Parses tool calls in the OpenAI Harmony channel format used by GPT-OSS:
//! ```text
//! <|channel|>commentary to=functions.get_weather <|constrain|>json<|message|>{"city": "NYC"}<|call|>
//! ```
//!
//! Both the `commentary` and `analysis` channels may carry calls; the
//! `functions.` namespace prefix is stripped from the target name. The
//! `<|constrain|>json` and `<|message|>` tokens are optional, and a missing
//! `<|call|>` terminator reads to end-of-string.

use super::{find_json_objects, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

const CHANNEL_TOKEN: &str = "<|channel|>";

static CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\|channel\|>\s*(?:commentary|analysis)\s+to=([^\s<]+)(.*?)(?:<\|call\|>|$)")
        .expect("CALL_REGEX pattern is invalid")
});

/// Parser for GPT-OSS channel-format tool calls.
#[derive(Debug, Clone, Default)]
pub struct GptOssToolParser;

impl GptOssToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for GptOssToolParser {
    fn name(&self) -> &'static str {
        "gpt_oss"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains(CHANNEL_TOKEN) {
            return Ok(Vec::new());
        }

        let mut calls = Vec::new();
        for cap in CALL_REGEX.captures_iter(output) {
            let target = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let region = cap.get(2).map(|m| m.as_str()).unwrap_or("");

            let name = target.strip_prefix("functions.").unwrap_or(target);
            if name.is_empty() {
                continue;
            }

            let arguments = find_json_objects(region)
                .into_iter()
                .find(|candidate| {
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
