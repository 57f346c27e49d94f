//! Blocks.

use isaac_types::{hash_of, Address, Hash, Timestamp};
use serde::{Deserialize, Serialize};

/// The signable body of a [`Block`] — everything `hash` is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBody {
    pub height: u64,
    pub prev_hash: Hash,
    pub round: u64,
    pub proposer: Address,
    pub proposer_transaction_hash: Hash,
    pub transactions: Vec<Hash>,
}

impl BlockBody {
    #[must_use]
    pub fn hash(&self) -> Hash {
        hash_of(self)
    }
}

/// A confirmed block. `hash` is the canonical hash of `body`; any mutation
/// of `body` changes `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash,
    pub body: BlockBody,
    pub confirmed: Timestamp,
}

impl Block {
    #[must_use]
    pub fn new(
        height: u64,
        prev_hash: Hash,
        round: u64,
        proposer: Address,
        proposer_transaction_hash: Hash,
        transactions: Vec<Hash>,
        confirmed: Timestamp,
    ) -> Self {
        let body = BlockBody {
            height,
            prev_hash,
            round,
            proposer,
            proposer_transaction_hash,
            transactions,
        };
        let hash = body.hash();
        Block { hash, body, confirmed }
    }

    #[must_use]
    pub fn height(&self) -> u64 {
        self.body.height
    }

    #[must_use]
    pub fn total_txs(&self) -> u64 {
        self.body.transactions.len() as u64
    }
}
