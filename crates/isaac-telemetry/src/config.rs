//! Telemetry configuration, read from the environment.

use std::env;

/// How a node's logs are filtered and formatted.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive string, e.g. `"info"` or `"isaac_consensus=debug,info"`.
    pub log_filter: String,
    /// Emit newline-delimited JSON instead of human-readable text.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Read `RUST_LOG` for the filter directive and `ISAAC_LOG_JSON` for the
    /// output format; falls back to sensible defaults for local development.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json: env::var("ISAAC_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
