//! Gateway entry point.
//!
//! Starts two HTTP servers sharing one backend client: the emulation
//! server (tool-calling emulated via prompt rewriting and reply mining)
//! and the passthrough server (verbatim forwarding for native tool
//! support). Configuration comes from the environment with CLI flags
//! taking precedence; any invalid value aborts startup with exit code 1.

use std::sync::Arc;

use clap::Parser;

use tcgw_server::api::{create_emulate_router, create_passthrough_router, AppState};
use tcgw_server::config::GatewayConfig;
use tcgw_server::egress::build_client;
use tcgw_server::logging;
use tcgw_server::shutdown::shutdown_signal;

#[derive(Parser)]
#[command(
    name = "tcgw-server",
    version,
    about = "Tool-calling emulation gateway for OpenAI-compatible backends"
)]
struct Cli {
    /// Backend router base URL (env: BIFROST_URL)
    #[arg(long)]
    bifrost_url: Option<String>,

    /// Bearer token forwarded to the backend (env: BIFROST_API_KEY)
    #[arg(long)]
    bifrost_api_key: Option<String>,

    /// Listening port of the emulation server (env: EMULATE_PORT)
    #[arg(long)]
    emulate_port: Option<String>,

    /// Listening port of the passthrough server (env: PASSTHROUGH_PORT)
    #[arg(long)]
    passthrough_port: Option<String>,

    /// Per-forward deadline in milliseconds (env: REQUEST_TIMEOUT)
    #[arg(long)]
    request_timeout: Option<String>,

    /// Verbose logging (env: DEBUG_MODE=true)
    #[arg(long)]
    debug: bool,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let debug = cli.debug
        || env_var("DEBUG_MODE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

    let config = match GatewayConfig::from_values(
        cli.bifrost_url.or_else(|| env_var("BIFROST_URL")),
        cli.bifrost_api_key.or_else(|| env_var("BIFROST_API_KEY")),
        cli.emulate_port.or_else(|| env_var("EMULATE_PORT")),
        cli.passthrough_port.or_else(|| env_var("PASSTHROUGH_PORT")),
        cli.request_timeout.or_else(|| env_var("REQUEST_TIMEOUT")),
        Some(debug),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(config.debug);

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to create HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let config = Arc::new(config);
    let emulate_app =
        create_emulate_router(AppState::new(config.clone(), client.clone(), "emulate"));
    let passthrough_app =
        create_passthrough_router(AppState::new(config.clone(), client, "passthrough"));

    let emulate_addr = format!("0.0.0.0:{}", config.emulate_port);
    let passthrough_addr = format!("0.0.0.0:{}", config.passthrough_port);

    let emulate_listener = match tokio::net::TcpListener::bind(&emulate_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind emulation server on {emulate_addr}: {e}");
            std::process::exit(1);
        }
    };
    let passthrough_listener = match tokio::net::TcpListener::bind(&passthrough_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind passthrough server on {passthrough_addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        emulate = %emulate_addr,
        passthrough = %passthrough_addr,
        backend = %config.bifrost_url,
        timeout_ms = config.request_timeout_ms,
        "tcgw gateway starting"
    );

    let emulate_server = async {
        axum::serve(emulate_listener, emulate_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    let passthrough_server = async {
        axum::serve(passthrough_listener, passthrough_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    if let Err(e) = tokio::try_join!(emulate_server, passthrough_server) {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("tcgw gateway stopped");
}
