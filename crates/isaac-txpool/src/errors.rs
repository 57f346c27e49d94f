//! Transaction pool errors.

use thiserror::Error;

/// Errors raised by [`crate::TransactionPool`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool full: at capacity of {capacity} transactions")]
    PoolFull { capacity: usize },

    #[error("client {0} is at its transaction limit")]
    ClientLimitReached(String),

    #[error("transaction is malformed: {0}")]
    Malformed(String),
}
