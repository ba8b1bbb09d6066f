//! Tool-call extraction from free-text model output.
//!
//! Models without native function calling emit tool invocations in a zoo of
//! textual dialects. This module provides one permissive parser per dialect:
//! - **DeepSeek V3.1 / R1**: Unicode token delimited, `<｜tool▁call▁begin｜>name<｜tool▁sep｜>args<｜tool▁call▁end｜>`
//! - **Command R7B**: `<|START_ACTION|>[{"tool_name": ..., "parameters": ...}]<|END_ACTION|>`
//! - **Granite**: `<tool_call>` followed by a JSON array of `{name, arguments}`
//! - **GLM 4.5**: `<tool_call>` with `<arg_key>`/`<arg_value>` pairs, first pair names the function
//! - **Qwen3-Coder**: `<tool_call><function>name</function><parameter>key=value</parameter></tool_call>`
//! - **Xiaomi MiMo**: `<tool_call>name=..., arguments={...}</tool_call>`
//! - **Hermes 2 Pro**: `<tool_call>{"name": ..., "arguments": ...}</tool_call>` and tag variants
//! - **GPT-OSS**: `<|channel|>commentary to=name <|message|>{...}<|call|>`
//! - **Seed-OSS**: `<seed:tool_call><function>name</function><parameter>key=value</parameter></seed:tool_call>`
//! - **Nemotron v2**: `<TOOLCALL>[{"name": ..., "arguments": ...}]</TOOLCALL>`
//! - **Apertus**: `<|tools_prefix|>[{"name": args}]<|tools_suffix|>`
//! - **LFM2**: `<|tool_call_start|>[{"name": ..., "arguments": ...}]<|tool_call_end|>`
//! - **MiniMax-M2**: `<minimax:tool_call><invoke name="..."><parameter name="...">v</parameter></invoke></minimax:tool_call>`
//! - **Kimi K2**: `<|tool_call_begin|>name<|tool_call_argument_begin|>{...}<|tool_call_end|>`
//! - **Apriel 1.5**: `<tool_calls><name>n</name>, <arguments>{...}</arguments></tool_calls>`
//! - **Firefunction v2**: ` functools[{"name": ..., "arguments": ...}]`
//! - **Functionary v3.2 / v3.1**: `>>>name\n{...}` and `<function=name>{...}</function>`
//! - **Llama 3.x**: bare `{"type": "function", "name": ..., "parameters": {...}}` in prose
//! - **Magistral / Mistral Nemo**: `[TOOLCALLS]` / `[TOOL_CALLS]` + JSON array
//! - **XML emulation**: the `<function_calls><invoke name="...">` format this
//!   gateway instructs models to use
//! - **JSON / Markdown-JSON / Generic**: fallbacks for models that answer
//!   with an OpenAI-shaped `tool_calls` payload in plain or fenced JSON
//!
//! [`extract_tool_calls`] runs the registry in priority order and returns the
//! first parser's non-empty result, so narrow delimiters always beat the
//! generic JSON fallbacks.

mod apertus;
mod apriel;
mod command_r7b;
mod deepseek_r1;
mod deepseek_v31;
mod emulation;
mod firefunction;
mod functionary_v31;
mod functionary_v32;
mod generic;
mod glm45;
mod gpt_oss;
mod granite;
mod hermes;
mod json_parser;
mod kimi_k2;
mod lfm2;
mod llama;
mod magistral;
mod markdown;
mod mimo;
mod minimax_m2;
mod mistral;
mod nemotron;
mod qwen3coder;
mod seed_oss;

pub use apertus::ApertusToolParser;
pub use apriel::AprielToolParser;
pub use command_r7b::CommandR7bToolParser;
pub use deepseek_r1::DeepSeekR1ToolParser;
pub use deepseek_v31::DeepSeekV31ToolParser;
pub use emulation::XmlToolParser;
pub use firefunction::FirefunctionToolParser;
pub use functionary_v31::FunctionaryV31ToolParser;
pub use functionary_v32::FunctionaryV32ToolParser;
pub use generic::GenericToolParser;
pub use glm45::Glm45ToolParser;
pub use gpt_oss::GptOssToolParser;
pub use granite::GraniteToolParser;
pub use hermes::HermesToolParser;
pub use json_parser::JsonToolParser;
pub use kimi_k2::KimiK2ToolParser;
pub use lfm2::Lfm2ToolParser;
pub use llama::LlamaToolParser;
pub use magistral::MagistralToolParser;
pub use markdown::MarkdownJsonToolParser;
pub use mimo::MimoToolParser;
pub use minimax_m2::MinimaxM2ToolParser;
pub use mistral::MistralToolParser;
pub use nemotron::NemotronToolParser;
pub use qwen3coder::Qwen3CoderToolParser;
pub use seed_oss::SeedOssToolParser;

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A tool call in OpenAI canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Type of the call (always "function")
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function being called
    pub function: FunctionCall,
}

/// Function call details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as a JSON object string
    pub arguments: String,
}

impl ToolCall {
    /// Build a call with a fresh id. Used by dialects that carry no id.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::with_id(generate_tool_call_id(), name, arguments)
    }

    /// Build a call with the id the dialect supplied.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Tool definition as declared in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (typically "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema describing the function parameters
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// Tool choice specification. Accepted for schema compatibility; the
/// gateway strips it before forwarding and never enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// "auto" / "none" / "required"
    Mode(String),
    /// `{"type": "function", "function": {"name": ...}}`
    Specific(serde_json::Value),
}

/// Trait implemented by every dialect parser.
///
/// Parsers are pure and total: any input yields `Ok` with a possibly empty
/// list, malformed entries are skipped, and a missing close marker is read
/// as end-of-string. An `Err` is treated by the pipeline as "no match".
pub trait ToolCallParser: Send + Sync {
    /// Short dialect identifier used in logs.
    fn name(&self) -> &'static str;

    /// Parse tool calls from the given output text.
    fn parse(&self, output: &str) -> anyhow::Result<Vec<ToolCall>>;

    /// Check if the output contains any tool calls.
    fn has_tool_calls(&self, output: &str) -> bool {
        self.parse(output).map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// The parser registry in priority order.
///
/// More-specific delimiters outrank generic JSON so that a broad parser
/// never steals a narrower dialect's match: GLM 4.5 and Qwen3-Coder share
/// the `<tool_call>` tag with Hermes but have disjoint inner grammars, so
/// they run first; the generic JSON parsers run dead last.
static PARSERS: LazyLock<Vec<Box<dyn ToolCallParser>>> = LazyLock::new(|| {
    vec![
        Box::new(DeepSeekV31ToolParser::new()),
        Box::new(DeepSeekR1ToolParser::new()),
        Box::new(CommandR7bToolParser::new()),
        Box::new(GraniteToolParser::new()),
        Box::new(Glm45ToolParser::new()),
        Box::new(Qwen3CoderToolParser::new()),
        Box::new(MimoToolParser::new()),
        Box::new(HermesToolParser::new()),
        Box::new(GptOssToolParser::new()),
        Box::new(SeedOssToolParser::new()),
        Box::new(NemotronToolParser::new()),
        Box::new(ApertusToolParser::new()),
        Box::new(Lfm2ToolParser::new()),
        Box::new(MinimaxM2ToolParser::new()),
        Box::new(KimiK2ToolParser::new()),
        Box::new(AprielToolParser::new()),
        Box::new(FirefunctionToolParser::new()),
        Box::new(FunctionaryV32ToolParser::new()),
        Box::new(FunctionaryV31ToolParser::new()),
        Box::new(LlamaToolParser::new()),
        Box::new(MagistralToolParser::new()),
        Box::new(MistralToolParser::new()),
        Box::new(XmlToolParser::new()),
        Box::new(JsonToolParser::new()),
        Box::new(MarkdownJsonToolParser::new()),
        Box::new(GenericToolParser::new()),
    ]
});

/// Run the extraction pipeline: the first parser returning a non-empty
/// list wins. Parser errors count as "no match" and never propagate.
pub fn extract_tool_calls(output: &str) -> Vec<ToolCall> {
    for parser in PARSERS.iter() {
        match parser.parse(output) {
            Ok(calls) if !calls.is_empty() => {
                tracing::debug!(
                    dialect = parser.name(),
                    count = calls.len(),
                    "extracted tool calls"
                );
                return calls;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(dialect = parser.name(), error = %e, "parser error, skipping");
            }
        }
    }
    Vec::new()
}

/// Generate a unique tool call ID: `call_` + 8 random lowercase
/// alphanumerics from a cryptographically strong RNG.
pub fn generate_tool_call_id() -> String {
    format!("call_{}", random_id_suffix())
}

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub(crate) fn random_id_suffix() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Normalize a dialect's `arguments` value to the OpenAI canonical form:
/// a string containing a JSON object. Accepts both object-shaped values
/// and strings that themselves encode a JSON object; anything else
/// collapses to `"{}"`.
pub(super) fn normalize_arguments(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(serde_json::Value::Object(_)) => trimmed.to_string(),
                _ => "{}".to_string(),
            }
        }
        _ => "{}".to_string(),
    }
}

/// Find complete JSON objects at the top level of a string.
///
/// Tracks brace depth and string/escape state, so braces inside quoted
/// strings do not confuse the scan. Returns slices of each `{...}`.
pub(super) fn find_json_objects(s: &str) -> Vec<&str> {
    find_balanced(s, '{', '}')
}

/// Find complete JSON arrays at the top level of a string.
pub(super) fn find_json_arrays(s: &str) -> Vec<&str> {
    find_balanced(s, '[', ']')
}

fn find_balanced(s: &str, open: char, close: char) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth: i32 = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s_idx) = start {
                        spans.push(&s[s_idx..i + close.len_utf8()]);
                    }
                    start = None;
                } else if depth < 0 {
                    depth = 0;
                }
            }
            _ => {}
        }
    }

    spans
}
