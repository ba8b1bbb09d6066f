//! Parser for the gateway's own XML emulation format.
//!
//! The prompt embedder instructs models to answer with:
//! ```text
//! <function_calls>
//!   <invoke name="get_weather">
//!     <parameter name="city">Tokyo</parameter>
//!   </invoke>
//! </function_calls>
//! ```
//!
//! Parameter values are XML-unescaped and then type-inferred, so
//! `<parameter name="limit">10</parameter>` becomes the integer 10 and
//! `&amp;` in a value becomes `&`.

use super::{ToolCall, ToolCallParser};
use crate::xml::{infer_type, unescape_xml};
use regex::Regex;
use std::sync::LazyLock;

static FUNCTION_CALLS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<function_calls>(.*?)(?:</function_calls>|$)")
        .expect("FUNCTION_CALLS_REGEX pattern is invalid")
});

static INVOKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<invoke\s+name="([^"]+)">(.*?)(?:</invoke>|$)"#)
        .expect("INVOKE_REGEX pattern is invalid")
});

/// Values may contain an unescaped `<`, so the body is matched lazily up to
/// the close tag rather than with a `[^<]*` class.
static PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<parameter\s+name="([^"]+)">(.*?)</parameter>"#)
        .expect("PARAMETER_REGEX pattern is invalid")
});

/// Parser for the XML emulation format.
#[derive(Debug, Clone, Default)]
pub struct XmlToolParser;

impl XmlToolParser {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCallParser for XmlToolParser {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        let Some(block) = FUNCTION_CALLS_REGEX.captures(output) else {
            return Ok(Vec::new());
        };
        let body = block.get(1).map(|m| m.as_str()).unwrap_or("");

        let mut calls = Vec::new();
        for invoke in INVOKE_REGEX.captures_iter(body) {
            let name = invoke.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let inner = invoke.get(2).map(|m| m.as_str()).unwrap_or("");

            if name.is_empty() {
                continue;
            }

            let mut params = serde_json::Map::new();
            for param in PARAMETER_REGEX.captures_iter(inner) {
                let key = param.get(1).map(|m| m.as_str()).unwrap_or("");
                let value = param.get(2).map(|m| m.as_str()).unwrap_or("");
                if key.is_empty() {
                    continue;
                }
                params.insert(key.to_string(), infer_type(&unescape_xml(value)));
            }

            let arguments = serde_json::to_string(&serde_json::Value::Object(params))
                .unwrap_or_else(|_| "{}".to_string());
            calls.push(ToolCall::new(unescape_xml(name), arguments));
        }

        Ok(calls)
    }
}
