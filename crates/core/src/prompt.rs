//! Embedding of tool definitions into the system prompt.
//!
//! In emulation mode the structured `tools` field cannot be forwarded, so
//! the tool catalogue is serialized into an instructional preamble at the
//! top of the system message. The preamble teaches the model the
//! `<function_calls>` XML reply format that [`crate::tool_parser`] extracts.
//!
//! Embedding is idempotent: a previously injected preamble is located by
//! its sentinel lines and removed before the fresh catalogue is prepended,
//! so multi-turn conversations never accumulate stale tool lists.

use std::sync::LazyLock;

use crate::tool_parser::ToolDefinition;
use crate::types::{ChatCompletionRequest, ChatMessage, MessageContent};
use crate::xml::escape_xml;

/// Placeholder replaced by the serialized tool catalogue.
pub const TOOLS_XML_MARKER: &str = "{{TOOLS_XML}}";

/// First line of the preamble. The writer and the remover must agree on
/// these sentinels; change them only together.
pub const PREAMBLE_SENTINEL_OPEN: &str =
    "You are a helpful AI assistant with access to the following tools:";

/// Last line of the preamble.
pub const PREAMBLE_SENTINEL_CLOSE: &str =
    "Always use the exact tool names and parameter names as specified.";

/// The instructional preamble, assembled from the shared sentinels so the
/// removal logic can never drift out of sync with the text it removes.
static TOOL_SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    format!(
        r#"{PREAMBLE_SENTINEL_OPEN}

<tools>
{TOOLS_XML_MARKER}
</tools>

When you need to use a tool, respond in this exact format:
<function_calls>
  <invoke name="tool_name">
    <parameter name="param_name">value</parameter>
  </invoke>
</function_calls>

You can call multiple tools by adding more <invoke> blocks.
Never mix explanatory text with the tool call XML: respond with either the
<function_calls> block alone, or with a natural-language final answer once
all tools have been executed.
{PREAMBLE_SENTINEL_CLOSE}"#
    )
});

/// Serialize the tool catalogue as XML, preserving declaration order.
///
/// `<name>` and `<description>` are XML-escaped; the JSON-Schema
/// `<parameters>` body is emitted as single-line JSON *without* escaping,
/// because models must read it as JSON.
pub fn tools_xml(tools: &[ToolDefinition]) -> String {
    let mut xml = String::new();
    for tool in tools {
        xml.push_str("<tool>\n");
        xml.push_str(&format!(
            "  <name>{}</name>\n",
            escape_xml(&tool.function.name)
        ));
        xml.push_str(&format!(
            "  <description>{}</description>\n",
            escape_xml(tool.function.description.as_deref().unwrap_or(""))
        ));
        xml.push_str("  <parameters>\n");
        let params = tool
            .function
            .parameters
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok())
            .unwrap_or_else(|| "{}".to_string());
        xml.push_str(&format!("  {params}\n"));
        xml.push_str("  </parameters>\n</tool>\n");
    }
    xml
}

/// Render the full preamble for the given tool catalogue.
fn render_preamble(tools: &[ToolDefinition]) -> String {
    TOOL_SYSTEM_PROMPT.replace(TOOLS_XML_MARKER, &tools_xml(tools))
}

/// Remove every sentinel-delimited preamble block from a system message.
/// Content outside the sentinels is kept untouched.
fn strip_existing_preamble(content: &str) -> String {
    let mut result = content.to_string();
    loop {
        let Some(open) = result.find(PREAMBLE_SENTINEL_OPEN) else {
            break;
        };
        let Some(close_rel) = result[open..].find(PREAMBLE_SENTINEL_CLOSE) else {
            break;
        };
        let close = open + close_rel + PREAMBLE_SENTINEL_CLOSE.len();
        let mut stripped = String::with_capacity(result.len());
        stripped.push_str(result[..open].trim_end());
        stripped.push_str(result[close..].trim_start());
        result = stripped;
    }
    result
}

/// Embed the declared tools into the request's system prompt and clear the
/// structured `tools`/`tool_choice` fields.
///
/// A request without tools passes through untouched. When the first message
/// is already a system message, its non-preamble content is preserved after
/// a blank line; otherwise a new system message is prepended.
pub fn embed_tools(req: &mut ChatCompletionRequest) {
    let Some(tools) = req.tools.take() else {
        return;
    };
    if tools.is_empty() {
        req.tools = None;
        req.tool_choice = None;
        return;
    }

    let preamble = render_preamble(&tools);

    match req.messages.first_mut() {
        Some(first) if first.role == "system" => {
            let remainder = strip_existing_preamble(&first.text());
            let remainder = remainder.trim();
            let content = if remainder.is_empty() {
                preamble
            } else {
                format!("{preamble}\n\n{remainder}")
            };
            first.content = Some(MessageContent::Text(content));
        }
        _ => {
            req.messages.insert(0, ChatMessage::new("system", preamble));
        }
    }

    req.tool_choice = None;
    tracing::debug!(
        tool_count = tools.len(),
        message_count = req.messages.len(),
        "embedded tool catalogue into system prompt"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_parser::FunctionDefinition;

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: "get_weather".to_string(),
                description: Some("Get the current weather".to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {"city": {"type": "string"}},
                    "required": ["city"]
                })),
            },
        }
    }

    fn request_with_tools(messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "m".to_string(),
            messages,
            tools: Some(vec![weather_tool()]),
            tool_choice: None,
            stream: false,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn tools_xml_escapes_name_and_description() {
        let mut tool = weather_tool();
        tool.function.name = "a<b".to_string();
        tool.function.description = Some("uses \"quotes\" & 'apostrophes'".to_string());

        let xml = tools_xml(&[tool]);
        assert!(xml.contains("<name>a&lt;b</name>"));
        assert!(xml.contains("&quot;quotes&quot; &amp; &apos;apostrophes&apos;"));
    }

    #[test]
    fn tools_xml_parameters_not_escaped() {
        let xml = tools_xml(&[weather_tool()]);
        // JSON schema must stay readable as JSON, single-line.
        assert!(xml.contains(r#"{"type":"object""#));
        assert!(!xml.contains("&quot;type&quot;"));
    }

    #[test]
    fn tools_xml_preserves_order() {
        let mut a = weather_tool();
        a.function.name = "alpha".to_string();
        let mut b = weather_tool();
        b.function.name = "beta".to_string();

        let xml = tools_xml(&[a, b]);
        let alpha = xml.find("<name>alpha</name>").unwrap();
        let beta = xml.find("<name>beta</name>").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn embed_prepends_system_message() {
        let mut req = request_with_tools(vec![ChatMessage::new("user", "hi")]);
        embed_tools(&mut req);

        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        let content = req.messages[0].text();
        assert!(content.starts_with(PREAMBLE_SENTINEL_OPEN));
        assert!(content.contains("<name>get_weather</name>"));
        assert!(content.ends_with(PREAMBLE_SENTINEL_CLOSE));
        assert!(req.tools.is_none());
        assert!(req.tool_choice.is_none());
    }

    #[test]
    fn embed_reuses_existing_system_message() {
        let mut req = request_with_tools(vec![
            ChatMessage::new("system", "You speak like a pirate."),
            ChatMessage::new("user", "hi"),
        ]);
        embed_tools(&mut req);

        assert_eq!(req.messages.len(), 2);
        let content = req.messages[0].text();
        assert!(content.starts_with(PREAMBLE_SENTINEL_OPEN));
        assert!(content.contains("\n\nYou speak like a pirate."));
    }

    #[test]
    fn embed_without_tools_is_untouched() {
        let mut req = request_with_tools(vec![ChatMessage::new("user", "hi")]);
        req.tools = None;

        let before = serde_json::to_value(&req).unwrap();
        embed_tools(&mut req);
        assert_eq!(serde_json::to_value(&req).unwrap(), before);
    }

    #[test]
    fn embed_is_idempotent() {
        let mut once = request_with_tools(vec![
            ChatMessage::new("system", "Stay concise."),
            ChatMessage::new("user", "hi"),
        ]);
        embed_tools(&mut once);

        let mut twice = once.clone();
        twice.tools = Some(vec![weather_tool()]);
        embed_tools(&mut twice);

        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );

        // Exactly one preamble block in the system message.
        let content = twice.messages[0].text();
        assert_eq!(content.matches(PREAMBLE_SENTINEL_OPEN).count(), 1);
        assert_eq!(content.matches(PREAMBLE_SENTINEL_CLOSE).count(), 1);
    }

    #[test]
    fn stale_catalogue_replaced_on_reembed() {
        let mut req = request_with_tools(vec![
            ChatMessage::new("system", "Stay concise."),
            ChatMessage::new("user", "hi"),
        ]);
        embed_tools(&mut req);

        // Same conversation comes back with a different tool set.
        let mut other = weather_tool();
        other.function.name = "get_tides".to_string();
        req.tools = Some(vec![other]);
        embed_tools(&mut req);

        let content = req.messages[0].text();
        assert!(content.contains("<name>get_tides</name>"));
        assert!(!content.contains("<name>get_weather</name>"));
        assert!(content.contains("Stay concise."));
    }

    #[test]
    fn strip_keeps_text_outside_sentinels() {
        let content = format!(
            "{PREAMBLE_SENTINEL_OPEN}\nmiddle\n{PREAMBLE_SENTINEL_CLOSE}\n\nkept suffix"
        );
        assert_eq!(strip_existing_preamble(&content), "kept suffix");
    }

    #[test]
    fn strip_without_close_sentinel_is_noop() {
        let content = format!("{PREAMBLE_SENTINEL_OPEN}\nno close here");
        assert_eq!(strip_existing_preamble(&content), content);
    }

    #[test]
    fn empty_tool_list_only_clears_fields() {
        let mut req = request_with_tools(vec![ChatMessage::new("user", "hi")]);
        req.tools = Some(vec![]);
        embed_tools(&mut req);

        assert_eq!(req.messages.len(), 1);
        assert!(req.tools.is_none());
    }
}
