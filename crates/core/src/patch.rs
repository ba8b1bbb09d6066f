//! Rewriting of upstream responses into OpenAI `tool_calls` shape.
//!
//! The upstream body is kept as opaque JSON and only the fields that carry
//! tool-call semantics are touched: `choices[0].message.{content,tool_calls}`
//! and `choices[0].finish_reason`. Ids, timestamps, usage and fingerprints
//! keep their upstream provenance. When the upstream shape is too broken to
//! patch, a minimal OpenAI-shaped response is synthesized instead.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use crate::tool_parser::{random_id_suffix, ToolCall};

/// Generate a response ID: `chatcmpl_` + 8 random lowercase alphanumerics.
pub fn generate_response_id() -> String {
    format!("chatcmpl_{}", random_id_suffix())
}

/// Current Unix time in seconds.
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The assistant text of `choices[0].message.content`, when present.
pub fn extract_content(resp: &Value) -> Option<String> {
    resp.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// Patch the upstream response in place.
///
/// With extracted calls, `message.tool_calls` is set, `message.content`
/// becomes null and `finish_reason` becomes `"tool_calls"`. Without calls,
/// any `tool_calls` key is dropped, `finish_reason` becomes `"stop"` and
/// the content stays untouched.
///
/// Returns `false` when `choices[0]` or its `message` is missing or
/// mistyped; the caller then falls back to [`build_fallback_response`].
pub fn patch_response(resp: &mut Value, calls: &[ToolCall]) -> bool {
    let Some(choice) = resp
        .get_mut("choices")
        .and_then(Value::as_array_mut)
        .and_then(|choices| choices.first_mut())
        .and_then(Value::as_object_mut)
    else {
        return false;
    };

    {
        let Some(message) = choice.get_mut("message").and_then(Value::as_object_mut) else {
            return false;
        };

        if calls.is_empty() {
            message.remove("tool_calls");
        } else {
            message.insert(
                "tool_calls".to_string(),
                serde_json::to_value(calls).unwrap_or_else(|_| json!([])),
            );
            message.insert("content".to_string(), Value::Null);
        }
    }

    let finish_reason = if calls.is_empty() { "stop" } else { "tool_calls" };
    choice.insert("finish_reason".to_string(), json!(finish_reason));

    true
}

/// Synthesize a minimal OpenAI-shaped response when the upstream body
/// cannot be patched: fresh id, current time, zero usage, echoed model.
pub fn build_fallback_response(model: &str, content: &str, calls: &[ToolCall]) -> Value {
    let (message, finish_reason) = if calls.is_empty() {
        (
            json!({"role": "assistant", "content": content}),
            "stop",
        )
    } else {
        (
            json!({
                "role": "assistant",
                "content": Value::Null,
                "tool_calls": serde_json::to_value(calls).unwrap_or_else(|_| json!([])),
            }),
            "tool_calls",
        )
    };

    json!({
        "id": generate_response_id(),
        "object": "chat.completion",
        "created": timestamp_now(),
        "model": model,
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason,
        }],
        "usage": {
            "prompt_tokens": 0,
            "completion_tokens": 0,
            "total_tokens": 0,
        },
    })
}

/// Cleanup for passthrough mode: drop an empty `tool_calls` array and
/// rewrite a spurious `finish_reason: "tool_calls"` back to `"stop"` when
/// no calls are actually present.
pub fn sanitize_native_response(resp: &mut Value) {
    let Some(choices) = resp.get_mut("choices").and_then(Value::as_array_mut) else {
        return;
    };

    for choice in choices.iter_mut() {
        let Some(choice_obj) = choice.as_object_mut() else {
            continue;
        };

        let mut has_calls = false;
        if let Some(message) = choice_obj.get_mut("message").and_then(Value::as_object_mut) {
            match message.get("tool_calls").and_then(Value::as_array) {
                Some(calls) if calls.is_empty() => {
                    message.remove("tool_calls");
                }
                Some(_) => has_calls = true,
                None => {}
            }
        }

        if !has_calls
            && choice_obj.get("finish_reason").and_then(Value::as_str) == Some("tool_calls")
        {
            choice_obj.insert("finish_reason".to_string(), json!("stop"));
        }
    }
}
