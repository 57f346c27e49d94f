//! Node-level errors: everything a round-driving loop can fail with, folding
//! in each subsystem crate's own error type rather than duplicating variants.

use thiserror::Error;

use crate::container::config::ConfigError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] isaac_ledger::LedgerError),

    #[error(transparent)]
    Storage(#[from] isaac_storage::StorageError),

    #[error(transparent)]
    Pool(#[from] isaac_txpool::PoolError),

    #[error(transparent)]
    Validation(#[from] isaac_consensus::ValidationError),

    #[error(transparent)]
    Consensus(#[from] isaac_consensus::ConsensusError),

    #[error(transparent)]
    Network(#[from] isaac_network::NetworkError),

    #[error(transparent)]
    FinishBallot(#[from] isaac_blockengine::FinishBallotError),

    #[error(transparent)]
    Crypto(#[from] isaac_crypto::CryptoError),

    #[error("round {height}/{round} expired {retries} times without reaching quorum")]
    RoundStalled { height: u64, round: u64, retries: u32 },

    #[error("this node ({0}) is not a member of its own validator roster")]
    SelfNotInRoster(String),
}
