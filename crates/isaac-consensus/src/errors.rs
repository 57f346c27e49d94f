//! Consensus error types: ballot well-formedness rejections and round-level
//! failures, kept as two enums because the propagation rules differ — a
//! `ValidationError` is reported and counted without tearing anything down, a
//! `ConsensusError` abandons the current round.

use isaac_types::Address;
use thiserror::Error;

/// Why `IsWellFormed` rejected a ballot. Checked in a fixed order; the first
/// failing check is the one reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ballot is malformed: {0}")]
    InvalidMessage(String),

    #[error("ballot confirmed time is outside the allowed window")]
    IncorrectTime,

    #[error("bad signature: {0}")]
    BadSignature(String),

    #[error("unknown operation type: {0}")]
    UnknownOperationType(String),

    #[error("ballot proposes {count} operations, limit is {limit}")]
    TooManyOperations { count: usize, limit: usize },
}

/// Round-level failures. Unlike [`ValidationError`], these abandon the
/// current round rather than just rejecting one message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("received a ballot for a round already concluded: {0}")]
    NewButKnownMessage(String),

    #[error("connect message from unknown validator {0}")]
    ConnectFromUnknownValidator(Address),

    #[error("no known endpoint for validator {0}")]
    EndpointNotFound(Address),

    #[error("round {0} expired before reaching quorum")]
    RoundExpired(u64),

    #[error("validator {0} attempted a second YES vote in the same phase")]
    DuplicateVote(Address),
}
