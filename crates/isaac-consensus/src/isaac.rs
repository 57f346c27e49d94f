//! The ISAAC per-round state machine: vote tally, phase transitions,
//! timeouts, and proposer selection.
//!
//! One [`RoundState`] tracks a single (height, round) attempt. A node
//! advances it by feeding in well-formed ballots (already checked by
//! [`crate::validation::is_well_formed`]) and polling [`RoundState::tick`]
//! against a timeout.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use isaac_ledger::ballot::{Ballot, BallotState, Vote};
use isaac_types::Address;

use crate::config::ConsensusConfig;
use crate::errors::ConsensusError;

/// Picks the proposer for (height, round) by sorting the validator roster
/// and indexing at `(height + round) mod N`. Deterministic and independent
/// of message order, so every honest validator agrees on the proposer
/// without a separate election message.
#[must_use]
pub fn select_proposer(validators: &[Address], height: u64, round: u64) -> Option<Address> {
    if validators.is_empty() {
        return None;
    }
    let mut sorted: Vec<&Address> = validators.iter().collect();
    sorted.sort();
    let index = (height.wrapping_add(round)) as usize % sorted.len();
    Some(sorted[index].clone())
}

/// What happened after feeding a ballot into a round, or after a timeout tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The vote was recorded but quorum has not yet been reached for the
    /// current phase.
    Pending,
    /// Quorum reached; the round advances to the next phase.
    Advanced(BallotState),
    /// Quorum reached in `AllConfirm` — the round is done.
    Concluded,
    /// The current phase's timeout elapsed without quorum.
    Expired,
}

/// Per-round vote bookkeeping for one (height, round) attempt.
pub struct RoundState {
    pub height: u64,
    pub round: u64,
    phase: BallotState,
    phase_started: Duration,
    /// Validators that cast a YES vote for the current phase. Reset on every
    /// phase transition — a YES in SIGN does not carry over into ACCEPT.
    yes_votes: HashSet<Address>,
    /// Every address that has voted at all in the current phase, regardless
    /// of which way, so a second vote from the same validator at the same
    /// phase is rejected as a duplicate.
    voted: HashMap<Address, Vote>,
}

impl RoundState {
    #[must_use]
    pub fn new(height: u64, round: u64, now: Duration) -> Self {
        RoundState {
            height,
            round,
            phase: BallotState::Init,
            phase_started: now,
            yes_votes: HashSet::new(),
            voted: HashMap::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> BallotState {
        self.phase
    }

    /// Records a ballot's vote for the current phase. The ballot is assumed
    /// already well-formed; this only enforces round-level invariants
    /// (one vote per validator per phase) and tallies toward quorum.
    pub fn record(
        &mut self,
        ballot: &Ballot,
        config: &ConsensusConfig,
        connected_validators: usize,
    ) -> Result<RoundOutcome, ConsensusError> {
        if ballot.body.round.block_height != self.height || ballot.body.round.number != self.round {
            return Err(ConsensusError::NewButKnownMessage(format!(
                "ballot for ({}, {}) does not match round ({}, {})",
                ballot.body.round.block_height, ballot.body.round.number, self.height, self.round
            )));
        }
        if ballot.body.state != self.phase {
            return Err(ConsensusError::NewButKnownMessage(format!(
                "ballot phase {:?} does not match round phase {:?}",
                ballot.body.state, self.phase
            )));
        }
        let signer = ballot.body.signer.clone();
        if let Some(Vote::Yes) = self.voted.get(&signer) {
            return Err(ConsensusError::DuplicateVote(signer));
        }
        self.voted.insert(signer.clone(), ballot.body.vote);
        if ballot.body.vote == Vote::Yes {
            self.yes_votes.insert(signer);
        }

        let quorum = config.quorum(connected_validators);
        if self.yes_votes.len() >= quorum {
            return Ok(self.advance());
        }

        // A phase that can no longer reach YES-quorum is dead even before
        // its timeout: once more than half of the connected validators have
        // voted NO or EXPIRED, no amount of additional YES votes among the
        // rest can still reach `quorum`, so waiting out the timeout only
        // delays the inevitable retry with a rotated proposer.
        let no_or_expired = self
            .voted
            .values()
            .filter(|vote| matches!(vote, Vote::No | Vote::Expired))
            .count();
        if connected_validators > 0 && no_or_expired * 2 > connected_validators {
            return Ok(RoundOutcome::Expired);
        }

        Ok(RoundOutcome::Pending)
    }

    /// Advances to the next phase on quorum, resetting the per-phase tally.
    fn advance(&mut self) -> RoundOutcome {
        match self.phase.next() {
            Some(next) => {
                self.phase = next;
                self.yes_votes.clear();
                self.voted.clear();
                RoundOutcome::Advanced(next)
            }
            None => RoundOutcome::Concluded,
        }
    }

    /// The timeout configured for the current phase.
    #[must_use]
    pub fn phase_timeout(&self, config: &ConsensusConfig) -> Duration {
        match self.phase {
            BallotState::Init => config.timeout_init,
            BallotState::Sign => config.timeout_sign,
            BallotState::Accept => config.timeout_accept,
            BallotState::AllConfirm => config.timeout_all_confirm,
        }
    }

    /// Checks whether the current phase has exceeded its timeout as of
    /// `now`. Callers that get `Expired` should abandon this round and start
    /// `(height, round + 1)` with the rotated proposer.
    #[must_use]
    pub fn tick(&self, now: Duration, config: &ConsensusConfig) -> RoundOutcome {
        if now.saturating_sub(self.phase_started) >= self.phase_timeout(config) {
            RoundOutcome::Expired
        } else {
            RoundOutcome::Pending
        }
    }
}
