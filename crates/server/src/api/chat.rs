//! Emulation-mode chat completion handler.
//!
//! The request orchestrator: deserialize, embed the tool catalogue into the
//! prompt, forward to the backend, mine the reply for tool calls, and patch
//! the response into OpenAI `tool_calls` shape.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use tcgw_core::patch::{build_fallback_response, extract_content, patch_response};
use tcgw_core::prompt::embed_tools;
use tcgw_core::tool_parser::extract_tool_calls;
use tcgw_core::types::ChatCompletionRequest;

use super::error::ApiError;
use super::AppState;
use crate::egress::forward_chat;

pub async fn create_chat_completion(State(state): State<AppState>, body: Bytes) -> Response {
    let mut req: ChatCompletionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return ApiError::InvalidRequest(format!("Invalid JSON: {e}")).into_response();
        }
    };

    if req.stream {
        return ApiError::StreamingUnsupported.into_response();
    }

    tracing::debug!(
        model = %req.model,
        message_count = req.messages.len(),
        tool_count = req.tools.as_ref().map(Vec::len).unwrap_or(0),
        "emulation request received"
    );

    embed_tools(&mut req);

    let payload = match serde_json::to_value(&req) {
        Ok(payload) => payload,
        Err(e) => {
            return ApiError::InvalidRequest(format!("unserializable request: {e}"))
                .into_response();
        }
    };

    let mut upstream = match forward_chat(&state.http, &state.config, &payload).await {
        Ok(upstream) => upstream,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let content = extract_content(&upstream).unwrap_or_default();
    let calls = extract_tool_calls(&content);

    tracing::debug!(
        tool_call_count = calls.len(),
        "extraction pipeline finished"
    );

    if patch_response(&mut upstream, &calls) {
        Json(upstream).into_response()
    } else {
        // Upstream shape too broken to patch in place.
        Json(build_fallback_response(&req.model, &content, &calls)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::state_for_backend;
    use crate::api::{create_emulate_router, AppState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn post_chat(state: AppState, body: Value) -> (StatusCode, Value) {
        let app = create_emulate_router(state);
        let req = Request::post("/v1/chat/completions")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn backend_reply(content: &str) -> Value {
        json!({
            "id": "chatcmpl-upstream",
            "object": "chat.completion",
            "created": 1754000000,
            "model": "m",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop",
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 5, "total_tokens": 10},
        })
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let state = state_for_backend("http://127.0.0.1:1", "emulate");
        let app = create_emulate_router(state);

        let req = Request::post("/v1/chat/completions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn streaming_is_501() {
        let state = state_for_backend("http://127.0.0.1:1", "emulate");
        let (status, json) = post_chat(
            state,
            json!({"model": "m", "messages": [], "stream": true}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn plain_answer_passes_through_with_stop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(backend_reply("The capital of Japan is Tokyo.")),
            )
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let (status, json) = post_chat(
            state,
            json!({"model": "m", "messages": [{"role": "user", "content": "capital of Japan?"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let choice = &json["choices"][0];
        assert_eq!(choice["finish_reason"], "stop");
        assert_eq!(choice["message"]["content"], "The capital of Japan is Tokyo.");
        assert!(choice["message"].get("tool_calls").is_none());
        // Upstream provenance preserved.
        assert_eq!(json["id"], "chatcmpl-upstream");
    }

    #[tokio::test]
    async fn xml_reply_is_patched_into_tool_calls() {
        let server = MockServer::start().await;
        let xml = "<function_calls><invoke name=\"get_weather\"><parameter name=\"city\">Tokyo</parameter><parameter name=\"units\">celsius</parameter></invoke></function_calls>";
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_reply(xml)))
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let (status, json) = post_chat(
            state,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "weather in Tokyo?"}],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "get_weather",
                        "description": "Get the weather",
                        "parameters": {"type": "object", "properties": {}}
                    }
                }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let choice = &json["choices"][0];
        assert_eq!(choice["finish_reason"], "tool_calls");
        assert!(choice["message"]["content"].is_null());

        let call = &choice["message"]["tool_calls"][0];
        assert_eq!(call["type"], "function");
        assert_eq!(call["function"]["name"], "get_weather");
        let args: Value =
            serde_json::from_str(call["function"]["arguments"].as_str().unwrap()).unwrap();
        assert_eq!(args, json!({"city": "Tokyo", "units": "celsius"}));
    }

    #[tokio::test]
    async fn tools_are_embedded_and_stripped_before_forwarding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_reply("ok")))
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let _ = post_chat(
            state,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hi"}],
                "tools": [{
                    "type": "function",
                    "function": {"name": "lookup", "description": "d", "parameters": {}}
                }],
                "tool_choice": "auto"
            }),
        )
        .await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();

        assert!(forwarded.get("tools").is_none());
        assert!(forwarded.get("tool_choice").is_none());
        assert_eq!(forwarded["messages"][0]["role"], "system");
        assert!(forwarded["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("<name>lookup</name>"));
    }

    #[tokio::test]
    async fn opaque_sampling_fields_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_reply("ok")))
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let _ = post_chat(
            state,
            json!({
                "model": "m",
                "messages": [],
                "temperature": 0.2,
                "max_tokens": 64
            }),
        )
        .await;

        let requests = server.received_requests().await.unwrap();
        let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(forwarded["temperature"], 0.2);
        assert_eq!(forwarded["max_tokens"], 64);
    }

    #[tokio::test]
    async fn broken_upstream_shape_gets_fallback_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"weird": true})))
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let (status, json) =
            post_chat(state, json!({"model": "m", "messages": []})).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["id"].as_str().unwrap().starts_with("chatcmpl_"));
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["model"], "m");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["usage"]["total_tokens"], 0);
    }

    #[tokio::test]
    async fn backend_error_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "model not found", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let state = state_for_backend(&server.uri(), "emulate");
        let (status, json) =
            post_chat(state, json!({"model": "nope", "messages": []})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["message"], "model not found");
    }

    #[tokio::test]
    async fn unreachable_backend_is_503() {
        let state = state_for_backend("http://127.0.0.1:9", "emulate");
        let (status, json) =
            post_chat(state, json!({"model": "m", "messages": []})).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["type"], "service_unavailable_error");
    }
}
