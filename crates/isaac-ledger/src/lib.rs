//! # isaac-ledger
//!
//! The block data model: accounts, operations, transactions, proposer
//! transactions, ballots, and blocks, plus the storage key layout and the
//! genesis construction/validation that anchors height 0.
//!
//! This crate defines shapes and structural checks only (hashing, signature
//! verification, arithmetic). State-dependent validation — does the source
//! have funds, does the target already exist — belongs to `isaac_blockengine`,
//! which reads and writes these types through a storage batch.

pub mod account;
pub mod ballot;
pub mod block;
pub mod errors;
pub mod genesis;
pub mod keys;
pub mod operation;
pub mod proposer_transaction;
pub mod transaction;
pub mod wire;

pub use account::Account;
pub use ballot::{Ballot, BallotBody, BallotState, Proposed, Round, Vote};
pub use block::{Block, BlockBody};
pub use errors::LedgerError;
pub use operation::{Operation, Payable, PayableRef};
pub use proposer_transaction::{ProposerTransaction, ProposerTransactionBody};
pub use transaction::{BlockTransaction, Transaction, TransactionBody, TransactionHistory};
