//! Ledger error types.

use isaac_types::{Address, Hash};
use thiserror::Error;

/// Errors raised by the block data model.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} does not exist")]
    BlockAccountDoesNotExist(Address),

    #[error("account {0} already exists")]
    BlockAccountAlreadyExists(Address),

    #[error("block {0} already exists")]
    BlockAlreadyExists(Hash),

    #[error("record already saved")]
    AlreadySaved,

    #[error("wrong block found: {0}")]
    WrongBlockFound(String),

    #[error("transaction {0} not found")]
    TransactionNotFound(Hash),

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("operation amount arithmetic underflowed or overflowed")]
    OperationAmountUnderflow,

    #[error("new account amount below the required reserve")]
    InsufficientAmountNewAccount,

    #[error("two transactions in the same ballot share source {0}")]
    TransactionSameSource(Address),

    #[error("account {account} expected sequence-id {expected}, transaction carries {got}")]
    SequenceMismatch { account: Address, expected: u64, got: u64 },

    #[error("operation targets its own transaction source")]
    SelfTargetingOperation,

    #[error("unknown operation type: {0}")]
    UnknownOperationType(String),

    #[error("bad signature: {0}")]
    BadSignature(String),

    #[error(transparent)]
    Storage(#[from] isaac_storage::StorageError),

    #[error(transparent)]
    Types(#[from] isaac_types::TypesError),
}
