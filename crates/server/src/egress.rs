//! Outbound HTTP to the backend router.
//!
//! A single pooled `reqwest::Client` is built at startup and shared by all
//! requests; the per-forward deadline comes from configuration. Transport
//! failures are classified here so the API layer can map them onto the
//! OpenAI error wire shape. The gateway never retries.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::GatewayConfig;

/// Connection timeout, separate from the overall request deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for the lightweight health probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The per-request deadline expired.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// DNS failure or connection refused.
    #[error("Backend service unavailable: {0}")]
    Unreachable(String),

    /// Any other transport-level failure.
    #[error("Backend service error: {0}")]
    Transport(String),

    /// The backend answered with something that is not JSON.
    #[error("Invalid response from backend (JSON parse failed)")]
    NonJsonBody,

    /// The backend answered with a JSON error body; forwarded verbatim
    /// with its original status.
    #[error("Backend returned status {status}")]
    Upstream { status: u16, body: Value },
}

/// Build the shared HTTP client with connection pooling and the configured
/// request deadline.
pub fn build_client(config: &GatewayConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(32)
        .user_agent(concat!("tcgw/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()
}

/// POST a chat completion body to the backend and return its JSON reply.
pub async fn forward_chat(
    client: &reqwest::Client,
    config: &GatewayConfig,
    body: &Value,
) -> Result<Value, ForwardError> {
    let url = config.chat_completions_url();
    tracing::debug!(%url, timeout_ms = config.request_timeout_ms, "forwarding to backend");

    let mut request = client.post(&url).json(body);
    if let Some(key) = &config.bifrost_api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| classify_transport_error(e, config.request_timeout_ms))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_transport_error(e, config.request_timeout_ms))?;

    tracing::debug!(status = status.as_u16(), body_len = bytes.len(), "backend replied");

    let json: Value = serde_json::from_slice(&bytes).map_err(|_| ForwardError::NonJsonBody)?;

    if status.as_u16() >= 400 {
        return Err(ForwardError::Upstream {
            status: status.as_u16(),
            body: json,
        });
    }

    Ok(json)
}

/// Probe the backend's OpenAI surface. Any HTTP answer counts as reachable;
/// only transport failures mark the backend down.
pub async fn probe_backend(client: &reqwest::Client, config: &GatewayConfig) -> bool {
    client
        .get(config.probe_url())
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .is_ok()
}

fn classify_transport_error(e: reqwest::Error, timeout_ms: u64) -> ForwardError {
    if e.is_timeout() {
        ForwardError::Timeout(timeout_ms)
    } else if e.is_connect() {
        ForwardError::Unreachable(e.to_string())
    } else {
        ForwardError::Transport(e.to_string())
    }
}
