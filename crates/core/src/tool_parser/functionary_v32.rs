//! Functionary v3.2 tool call parser.
//!
//! Parses tool calls in the MeetKai Functionary v3.2 section format:
//! ```text
//! >>>get_weather
//! {"city": "NYC"}<<<
//! >>>python
//! print("hello")<<<
//! ```
//!
//! Section headers start at the beginning of a line. `all` introduces plain
//! assistant content, never a call. `python` followed by something that is
//! not a JSON object is a code call, wrapped as `{"code": "..."}`.

use super::{find_json_objects, ToolCall, ToolCallParser};
use regex::Regex;
use std::sync::LazyLock;

const SECTION_MARKER: &str = ">>>";

/// `>>>name` at the start of a line (or of the whole output).
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^>>>([^\n]*)").expect("HEADER_REGEX pattern is invalid")
});

/// Parser for Functionary v3.2-style tool calls.
#[derive(Debug, Clone, Default)]
pub struct FunctionaryV32ToolParser;

impl FunctionaryV32ToolParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_section(name: &str, body: &str) -> Option<ToolCall> {
        let body = body.trim().trim_end_matches("<<<").trim();

        match name {
            "" | "all" => None,
            "python" => {
                // A JSON object after >>>python is the reserved form, not
                // a code call.
                if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(body).is_ok()
                {
                    return None;
                }
                if body.is_empty() {
                    return None;
                }
                let arguments =
                    serde_json::to_string(&serde_json::json!({ "code": body }))
                        .unwrap_or_else(|_| "{}".to_string());
                Some(ToolCall::new("python", arguments))
            }
            _ => {
                let arguments = find_json_objects(body)
                    .into_iter()
                    .find(|candidate| {
                        serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
                            candidate,
                        )
                        .is_ok()
                    })?
                    .to_string();
                Some(ToolCall::new(name, arguments))
            }
        }
    }
}

impl ToolCallParser for FunctionaryV32ToolParser {
    fn name(&self) -> &'static str {
        "functionary_v32"
    }

    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>> {
        if !output.contains(SECTION_MARKER) {
            return Ok(Vec::new());
        }

        // Collect header spans first so each section body runs to the next
        // header or to end-of-string.
        let headers: Vec<(usize, usize, String)> = HEADER_REGEX
            .captures_iter(output)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let name = cap.get(1)?.as_str().trim().to_string();
                Some((whole.start(), whole.end(), name))
            })
            .collect();

        let mut calls = Vec::new();
        for (i, (_, header_end, name)) in headers.iter().enumerate() {
            let body_end = headers
                .get(i + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(output.len());
            let body = &output[*header_end..body_end];

            if let Some(call) = Self::parse_section(name, body) {
                calls.push(call);
            }
        }

        Ok(calls)
    }
}
