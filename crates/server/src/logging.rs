//! Structured logging configuration.
//!
//! Two modes:
//! - Pretty: human-readable logs for development (default)
//! - JSON: machine-readable logs for log aggregation
//!
//! Set `TCGW_LOG_FORMAT=json` for JSON output. `RUST_LOG` controls the
//! filter; debug mode raises the default level to `debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty-printed human-readable logs (default).
    Pretty,
    /// JSON-formatted logs for production.
    Json,
}

impl LogFormat {
    /// Detect log format from the environment.
    pub fn from_env() -> Self {
        match std::env::var("TCGW_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the logging subsystem.
///
/// `debug` raises the default filter from `info` to `debug`; an explicit
/// `RUST_LOG` always wins. A second call (test harnesses) is a no-op.
pub fn init(debug: bool) {
    init_with_format(debug, LogFormat::from_env());
}

/// Initialize the logging subsystem with an explicit format.
pub fn init_with_format(debug: bool, format: LogFormat) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging subscriber was already initialized");
    }
}
