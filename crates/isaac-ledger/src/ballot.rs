//! Ballots: the signed messages validators exchange to agree on a block.
//!
//! This module carries only the data shape and structural helpers (hashing,
//! accessors). Well-formedness rules (`IsWellFormed`) and the voting state
//! machine live in the consensus crate, which depends on this one.

use isaac_crypto::Signature;
use isaac_types::{hash_of, Address, Hash, Timestamp};
use serde::{Deserialize, Serialize};

use crate::proposer_transaction::ProposerTransaction;

/// The four phases of one ISAAC round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BallotState {
    Init,
    Sign,
    Accept,
    AllConfirm,
}

impl BallotState {
    /// The phase that follows this one on a quorum-YES, or `None` once
    /// `AllConfirm` has closed the round.
    #[must_use]
    pub fn next(self) -> Option<BallotState> {
        match self {
            BallotState::Init => Some(BallotState::Sign),
            BallotState::Sign => Some(BallotState::Accept),
            BallotState::Accept => Some(BallotState::AllConfirm),
            BallotState::AllConfirm => None,
        }
    }
}

/// A validator's vote on a ballot at the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    Yes,
    No,
    Expired,
}

/// Identifies the round a ballot belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u64,
    pub block_height: u64,
    pub block_hash: Hash,
    pub total_txs: u64,
}

/// What a proposer is proposing for this round: an ordered set of pool
/// transaction hashes plus the proposer's own fee/inflation transaction.
///
/// Carries its own `confirmed` timestamp, independent of the enclosing
/// ballot's — the proposer stamps a proposal at the moment it builds it,
/// which may differ from the moment this particular vote message is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposed {
    pub transactions: Vec<Hash>,
    pub proposer_transaction: ProposerTransaction,
    pub confirmed: Timestamp,
}

/// The signable body of a [`Ballot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotBody {
    /// The address that signed and sent this ballot message. For an `Init`
    /// ballot this must equal `proposer`; for later phases it is whichever
    /// validator is casting this particular vote.
    pub signer: Address,
    pub proposer: Address,
    pub round: Round,
    pub state: BallotState,
    pub vote: Vote,
    pub proposed: Proposed,
    pub confirmed: Timestamp,
}

impl BallotBody {
    #[must_use]
    pub fn hash(&self) -> Hash {
        hash_of(self)
    }
}

/// A signed ballot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub hash: Hash,
    pub signature: Signature,
    pub body: BallotBody,
}

impl Ballot {
    #[must_use]
    pub fn hash_matches_body(&self) -> bool {
        self.hash == self.body.hash()
    }
}
