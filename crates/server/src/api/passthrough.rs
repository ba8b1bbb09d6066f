//! Passthrough-mode chat completion handler.
//!
//! Forwards the request body verbatim for backends with native tool
//! support, then applies a light cleanup: an empty `tool_calls` array is
//! dropped and a spurious `finish_reason: "tool_calls"` becomes `"stop"`.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use tcgw_core::patch::sanitize_native_response;

use super::error::ApiError;
use super::AppState;
use crate::egress::forward_chat;

pub async fn create_chat_completion(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return ApiError::InvalidRequest(format!("Invalid JSON: {e}")).into_response();
        }
    };

    tracing::debug!(
        model = payload.get("model").and_then(|v| v.as_str()).unwrap_or(""),
        "passthrough request received"
    );

    match forward_chat(&state.http, &state.config, &payload).await {
        Ok(mut upstream) => {
            sanitize_native_response(&mut upstream);
            Json(upstream).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
