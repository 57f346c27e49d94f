//! Network errors: infrastructure-level failures of the connection manager
//! itself. Connection-*protocol* failures (an unknown validator connecting,
//! no endpoint on file for a validator) are `isaac_consensus::ConsensusError`
//! variants, reused here rather than duplicated.

use thiserror::Error;

/// Errors raised by [`crate::manager::ConnectionManager`] and the broadcast
/// primitive.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("start timed out before reaching {required} connected validators (had {connected})")]
    StartTimedOut { connected: usize, required: usize },

    #[error("send to {endpoint} failed: {reason}")]
    SendFailed { endpoint: String, reason: String },

    #[error(transparent)]
    Consensus(#[from] isaac_consensus::ConsensusError),
}
