//! Gateway configuration.
//!
//! Configuration is environment-driven with CLI flags taking precedence
//! (see `main.rs`). All values are validated up front; the binary exits
//! with code 1 on the first invalid value.
//!
//! | Variable           | Default               | Range                |
//! |--------------------|-----------------------|----------------------|
//! | `BIFROST_URL`      | `http://0.0.0.0:7766` | http(s) URL          |
//! | `BIFROST_API_KEY`  | empty                 | any                  |
//! | `EMULATE_PORT`     | 3000                  | 1-65535              |
//! | `PASSTHROUGH_PORT` | 3001                  | 1-65535, != emulate  |
//! | `REQUEST_TIMEOUT`  | 120000 (ms)           | 5000-600000          |
//! | `DEBUG_MODE`       | false                 | bool                 |

use thiserror::Error;

pub const DEFAULT_BIFROST_URL: &str = "http://0.0.0.0:7766";
pub const DEFAULT_EMULATE_PORT: u16 = 3000;
pub const DEFAULT_PASSTHROUGH_PORT: u16 = 3001;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

pub const MIN_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIFROST_URL must start with http:// or https://, got '{0}'")]
    InvalidBackendScheme(String),
    #[error("invalid {name}: '{value}' is not a valid port (1-65535)")]
    InvalidPort { name: &'static str, value: String },
    #[error("EMULATE_PORT and PASSTHROUGH_PORT must be different, both are {0}")]
    PortCollision(u16),
    #[error(
        "REQUEST_TIMEOUT must be between {MIN_REQUEST_TIMEOUT_MS} and \
         {MAX_REQUEST_TIMEOUT_MS} milliseconds, got '{0}'"
    )]
    InvalidTimeout(String),
}

/// Validated gateway configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend router base URL.
    pub bifrost_url: String,
    /// Bearer token forwarded to the backend when non-empty.
    pub bifrost_api_key: Option<String>,
    /// Listening port of the emulation server.
    pub emulate_port: u16,
    /// Listening port of the passthrough server.
    pub passthrough_port: u16,
    /// Per-forward deadline in milliseconds.
    pub request_timeout_ms: u64,
    /// Verbose logging.
    pub debug: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bifrost_url: DEFAULT_BIFROST_URL.to_string(),
            bifrost_api_key: None,
            emulate_port: DEFAULT_EMULATE_PORT,
            passthrough_port: DEFAULT_PASSTHROUGH_PORT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl GatewayConfig {
    /// Build and validate a configuration from raw string values, using
    /// defaults for anything absent.
    pub fn from_values(
        bifrost_url: Option<String>,
        bifrost_api_key: Option<String>,
        emulate_port: Option<String>,
        passthrough_port: Option<String>,
        request_timeout: Option<String>,
        debug: Option<bool>,
    ) -> Result<Self, ConfigError> {
        let bifrost_url = bifrost_url.unwrap_or_else(|| DEFAULT_BIFROST_URL.to_string());
        if !bifrost_url.starts_with("http://") && !bifrost_url.starts_with("https://") {
            return Err(ConfigError::InvalidBackendScheme(bifrost_url));
        }
        // The base URL is joined with request paths; a trailing slash would
        // produce double slashes.
        let bifrost_url = bifrost_url.trim_end_matches('/').to_string();

        let emulate_port = parse_port("EMULATE_PORT", emulate_port, DEFAULT_EMULATE_PORT)?;
        let passthrough_port = parse_port(
            "PASSTHROUGH_PORT",
            passthrough_port,
            DEFAULT_PASSTHROUGH_PORT,
        )?;
        if emulate_port == passthrough_port {
            return Err(ConfigError::PortCollision(emulate_port));
        }

        let request_timeout_ms = match request_timeout {
            None => DEFAULT_REQUEST_TIMEOUT_MS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if (MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&ms) => ms,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        Ok(Self {
            bifrost_url,
            bifrost_api_key: bifrost_api_key.filter(|k| !k.is_empty()),
            emulate_port,
            passthrough_port,
            request_timeout_ms,
            debug: debug.unwrap_or(false),
        })
    }

    /// Full URL of the backend chat completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.bifrost_url)
    }

    /// Full URL of the backend surface probed by the health check.
    pub fn probe_url(&self) -> String {
        format!("{}/v1/models", self.bifrost_url)
    }
}

fn parse_port(
    name: &'static str,
    value: Option<String>,
    default: u16,
) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<u16>() {
            Ok(port) if port >= 1 => Ok(port),
            _ => Err(ConfigError::InvalidPort { name, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let config = GatewayConfig::from_values(None, None, None, None, None, None).unwrap();

        assert_eq!(config.bifrost_url, DEFAULT_BIFROST_URL);
        assert_eq!(config.emulate_port, 3000);
        assert_eq!(config.passthrough_port, 3001);
        assert_eq!(config.request_timeout_ms, 120_000);
        assert!(config.bifrost_api_key.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn backend_url_requires_http_scheme() {
        let err = GatewayConfig::from_values(
            Some("ftp://backend".to_string()),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidBackendScheme(_)));
    }

    #[test]
    fn backend_url_trailing_slash_trimmed() {
        let config = GatewayConfig::from_values(
            Some("http://backend:7766/".to_string()),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert_eq!(
            config.chat_completions_url(),
            "http://backend:7766/v1/chat/completions"
        );
    }

    #[test]
    fn port_out_of_range_rejected() {
        for bad in ["0", "65536", "abc", "-1"] {
            let err = GatewayConfig::from_values(
                None,
                None,
                Some(bad.to_string()),
                None,
                None,
                None,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort { .. }), "{bad}");
        }
    }

    #[test]
    fn colliding_ports_rejected() {
        let err = GatewayConfig::from_values(
            None,
            None,
            Some("4000".to_string()),
            Some("4000".to_string()),
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::PortCollision(4000)));
    }

    #[test]
    fn timeout_bounds_enforced() {
        for bad in ["4999", "600001", "0", "nope"] {
            let err = GatewayConfig::from_values(
                None,
                None,
                None,
                None,
                Some(bad.to_string()),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout(_)), "{bad}");
        }

        let config = GatewayConfig::from_values(
            None,
            None,
            None,
            None,
            Some("5000".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn empty_api_key_treated_as_absent() {
        let config = GatewayConfig::from_values(
            None,
            Some(String::new()),
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert!(config.bifrost_api_key.is_none());
    }
}
