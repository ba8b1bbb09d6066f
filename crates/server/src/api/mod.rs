//! HTTP surface of the gateway.

pub mod chat;
pub mod error;
pub mod health;
pub mod passthrough;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::GatewayConfig;

/// Shared per-process state. Cheap to clone; the HTTP client pools
/// connections internally.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
    /// Which surface this router serves; echoed by `/health`.
    pub mode: &'static str,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, http: reqwest::Client, mode: &'static str) -> Self {
        Self { config, http, mode }
    }
}

/// Router for the emulation surface.
pub fn create_emulate_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat::create_chat_completion))
        .route("/health", get(health::health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Router for the passthrough surface.
pub fn create_passthrough_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/chat/completions",
            post(passthrough::create_chat_completion),
        )
        .route("/health", get(health::health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
