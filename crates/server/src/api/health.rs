//! Health endpoint with a backend reachability probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tcgw_core::patch::timestamp_now;

use super::AppState;
use crate::egress::probe_backend;

pub async fn health_check(State(state): State<AppState>) -> Response {
    let backend_up = probe_backend(&state.http, &state.config).await;

    let status = if backend_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if backend_up { "ok" } else { "degraded" },
        "service": "tcgw",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.mode,
        "timestamp": timestamp_now(),
        "bifrost_status": if backend_up { "ok" } else { "unreachable" },
    });

    (status, Json(body)).into_response()
}
