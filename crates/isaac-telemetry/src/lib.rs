//! # isaac-telemetry
//!
//! Initializes the global `tracing` subscriber for a node process: an
//! `EnvFilter` plus either human-readable or JSON output. Every core crate
//! emits spans/events through `tracing` directly; this crate only owns the
//! one-time process-wide subscriber installation, matching `spec.md` §1's
//! exclusion of a metrics exporter — there is no Prometheus/OTLP surface
//! here, just logging.

pub mod config;
pub mod errors;

pub use config::TelemetryConfig;
pub use errors::TelemetryError;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Call once, near the top of `main`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    let result = if config.json {
        fmt().json().with_env_filter(filter).try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_malformed_filter_directive() {
        let config = TelemetryConfig {
            log_filter: "isaac_node=loud".to_string(),
            json: false,
        };
        assert!(matches!(init(&config), Err(TelemetryError::InvalidFilter(_))));
    }
}
