use thiserror::Error;

/// Errors from setting up the global tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive string in `TelemetryConfig::log_filter` is malformed.
    #[error("invalid log filter directive: {0}")]
    InvalidFilter(String),

    /// A global subscriber was already installed (e.g. `init` called twice).
    #[error("a global tracing subscriber is already set")]
    AlreadyInitialized,
}
