//! OpenAI-compatible chat completion request types.
//!
//! Only the fields the gateway inspects are modeled explicitly; everything
//! else (sampling parameters, vendor extensions) is captured in a flattened
//! map so the forwarded body is byte-equivalent in meaning to what the
//! client sent.

use serde::{Deserialize, Serialize};

use crate::tool_parser::{ToolCall, ToolChoice, ToolDefinition};

/// An OpenAI chat completion request as accepted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Available tools for the model to use. Cleared before forwarding
    /// in emulation mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Controls how the model uses tools. Cleared alongside `tools`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default)]
    pub stream: bool,
    /// Opaque passthrough fields (temperature, max_tokens, user, ...).
    /// Preserved verbatim when the request is re-serialized for the backend.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    /// String content, multimodal parts, or null (assistant tool-call turns).
    #[serde(default)]
    pub content: Option<MessageContent>,
    /// Tool calls emitted by a prior assistant turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Required when `role` is `tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a new text-only chat message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(MessageContent::Text(content.into())),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Flattened text content of this message (empty for null content).
    pub fn text(&self) -> String {
        self.content.as_ref().map(MessageContent::as_text).unwrap_or_default()
    }
}

/// Message content that is either plain text or multimodal parts.
///
/// Supports both OpenAI content shapes:
/// - a simple string: `"content": "Hello"`
/// - an array of parts: `"content": [{"type": "text", "text": "Hello"}, ...]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Flatten to text. Text parts are joined with a newline; image parts
    /// contribute nothing.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// An image reference in a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
