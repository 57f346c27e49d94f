//! Finish-ballot errors.

use thiserror::Error;

/// Errors raised while turning a confirmed ballot into a persisted block.
/// Deliberately reuses [`isaac_ledger::LedgerError`]'s `TransactionNotFound`,
/// `BlockAlreadyExists`, `AlreadySaved`, and balance/account variants rather
/// than duplicating them — this crate's own failure modes are all either
/// "the ledger rejected this" or "the batch couldn't be written".
#[derive(Debug, Error)]
pub enum FinishBallotError {
    #[error(transparent)]
    Ledger(#[from] isaac_ledger::LedgerError),

    #[error(transparent)]
    Storage(#[from] isaac_storage::StorageError),
}
