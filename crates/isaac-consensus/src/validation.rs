//! `IsWellFormed`: the ordered, fail-fast checks every ballot must pass
//! before it is allowed into the round state machine.

use isaac_crypto::PublicKey;
use isaac_ledger::ballot::{Ballot, BallotState, Vote};
use isaac_types::Timestamp;

use crate::config::ConsensusConfig;
use crate::errors::ValidationError;

/// The signer's last known chain position, used for the soft
/// height/hash check in step 8.
#[derive(Debug, Clone, Copy)]
pub struct KnownBlock {
    pub height: u64,
    pub hash: isaac_types::Hash,
}

/// Runs the eight `IsWellFormed` checks against `ballot`, in order, stopping
/// at the first failure.
pub fn is_well_formed(
    ballot: &Ballot,
    config: &ConsensusConfig,
    now: Timestamp,
    signer_key: &PublicKey,
    signer_known_block: Option<KnownBlock>,
) -> Result<(), ValidationError> {
    // 1. hash matches a re-hash of the body.
    if !ballot.hash_matches_body() {
        return Err(ValidationError::InvalidMessage(
            "ballot hash does not match its body".to_string(),
        ));
    }

    // 2. state/vote are members of their enums. Rust's type system already
    // makes any other value unrepresentable, so this step is a structural
    // no-op here — kept as an explicit match so a future variant addition
    // can't silently skip validation.
    match (ballot.body.state, ballot.body.vote) {
        (BallotState::Init | BallotState::Sign | BallotState::Accept | BallotState::AllConfirm, Vote::Yes | Vote::No | Vote::Expired) => {}
    }

    // 3. INIT ballots must be signed by the proposer.
    if ballot.body.state == BallotState::Init && ballot.body.signer != ballot.body.proposer {
        return Err(ValidationError::InvalidMessage(
            "INIT ballot signer must equal its proposer".to_string(),
        ));
    }

    // 4. signature verifies against the signer's key over (network-id || hash).
    signer_key
        .verify(&config.network_id, &ballot.hash, &ballot.signature)
        .map_err(|e| ValidationError::BadSignature(e.to_string()))?;

    // 5. both confirmed timestamps are within ±D of now.
    if !ballot.body.confirmed.within(now, config.block_time_delta) {
        return Err(ValidationError::IncorrectTime);
    }
    if !ballot.body.proposed.confirmed.within(now, config.block_time_delta) {
        return Err(ValidationError::IncorrectTime);
    }

    // 6. proposed transaction count within the configured ceiling.
    let count = ballot.body.proposed.transactions.len();
    if count > config.ops_in_ballot_limit {
        return Err(ValidationError::TooManyOperations {
            count,
            limit: config.ops_in_ballot_limit,
        });
    }

    // 7. the proposer transaction is well-formed and shaped CollectTxFee
    // then Inflation, verified under its own independent signature.
    let proposer_key = PublicKey::from_address(&ballot.body.proposer)
        .map_err(|e| ValidationError::InvalidMessage(e.to_string()))?;
    ballot
        .body
        .proposed
        .proposer_transaction
        .verify(&config.network_id, &proposer_key)
        .map_err(|e| ValidationError::BadSignature(e.to_string()))?;

    // 8. soft check: the round's block-height/hash should match what the
    // signer is known to have last confirmed. A mismatch is not itself
    // invalid here — the state machine (hard check) decides whether to
    // treat it as a stale or future round.
    if let Some(known) = signer_known_block {
        if ballot.body.round.block_height < known.height {
            tracing::debug!(
                round_height = ballot.body.round.block_height,
                known_height = known.height,
                "ballot references a height behind the signer's last known block"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isaac_crypto::KeyPair;
    use isaac_ledger::ballot::{BallotBody, Proposed, Round};
    use isaac_ledger::proposer_transaction::{ProposerTransaction, ProposerTransactionBody};
    use isaac_types::{Amount, Hash};

    fn well_formed_ballot(keypair: &KeyPair, config: &ConsensusConfig, now: Timestamp) -> Ballot {
        let proposer_tx_body = ProposerTransactionBody::new(
            keypair.address(),
            1,
            "common".to_string(),
            Amount::new(10),
            Amount::new(1),
        );
        let proposer_tx = ProposerTransaction::new_signed(keypair, &config.network_id, proposer_tx_body, now);
        let body = BallotBody {
            signer: keypair.address(),
            proposer: keypair.address(),
            round: Round {
                number: 0,
                block_height: 1,
                block_hash: Hash::from_bytes([0; 32]),
                total_txs: 0,
            },
            state: BallotState::Init,
            vote: Vote::Yes,
            proposed: Proposed {
                transactions: vec![],
                proposer_transaction: proposer_tx,
                confirmed: now,
            },
            confirmed: now,
        };
        let hash = body.hash();
        let signature = keypair.sign(&config.network_id, &hash);
        Ballot { hash, signature, body }
    }

    #[test]
    fn well_formed_ballot_passes() {
        let keypair = KeyPair::generate();
        let config = ConsensusConfig::default();
        let now = Timestamp::from_nanos(1_000_000_000);
        let ballot = well_formed_ballot(&keypair, &config, now);
        assert!(is_well_formed(&ballot, &config, now, &keypair.public_key(), None).is_ok());
    }

    #[test]
    fn stale_confirmed_time_is_rejected() {
        let keypair = KeyPair::generate();
        let config = ConsensusConfig::default();
        let now = Timestamp::from_nanos(1_000_000_000);
        let mut ballot = well_formed_ballot(&keypair, &config, now);
        let far_past = Timestamp::from_nanos(0);
        ballot.body.confirmed = far_past;
        ballot.hash = ballot.body.hash();
        ballot.signature = keypair.sign(&config.network_id, &ballot.hash);
        assert_eq!(
            is_well_formed(&ballot, &config, now, &keypair.public_key(), None),
            Err(ValidationError::IncorrectTime)
        );
    }

    #[test]
    fn init_ballot_signed_by_someone_other_than_the_proposer_is_rejected() {
        let proposer = KeyPair::generate();
        let impostor = KeyPair::generate();
        let config = ConsensusConfig::default();
        let now = Timestamp::from_nanos(1_000_000_000);
        let mut ballot = well_formed_ballot(&proposer, &config, now);
        ballot.body.signer = impostor.address();
        ballot.hash = ballot.body.hash();
        ballot.signature = impostor.sign(&config.network_id, &ballot.hash);
        assert!(matches!(
            is_well_formed(&ballot, &config, now, &impostor.public_key(), None),
            Err(ValidationError::InvalidMessage(_))
        ));
    }

    #[test]
    fn tampered_hash_is_rejected_before_any_other_check() {
        let keypair = KeyPair::generate();
        let config = ConsensusConfig::default();
        let now = Timestamp::from_nanos(1_000_000_000);
        let mut ballot = well_formed_ballot(&keypair, &config, now);
        ballot.body.round.number = 99;
        assert_eq!(
            is_well_formed(&ballot, &config, now, &keypair.public_key(), None),
            Err(ValidationError::InvalidMessage(
                "ballot hash does not match its body".to_string()
            ))
        );
    }

    #[test]
    fn too_many_proposed_transactions_is_rejected() {
        let keypair = KeyPair::generate();
        let mut config = ConsensusConfig::default();
        config.ops_in_ballot_limit = 0;
        let now = Timestamp::from_nanos(1_000_000_000);
        let mut ballot = well_formed_ballot(&keypair, &config, now);
        ballot.body.proposed.transactions = vec![Hash::from_bytes([1; 32])];
        ballot.hash = ballot.body.hash();
        ballot.signature = keypair.sign(&config.network_id, &ballot.hash);
        assert_eq!(
            is_well_formed(&ballot, &config, now, &keypair.public_key(), None),
            Err(ValidationError::TooManyOperations { count: 1, limit: 0 })
        );
    }

    #[test]
    fn sign_phase_ballot_may_be_signed_by_a_non_proposer() {
        let proposer = KeyPair::generate();
        let signer = KeyPair::generate();
        let config = ConsensusConfig::default();
        let now = Timestamp::from_nanos(1_000_000_000);
        let mut ballot = well_formed_ballot(&proposer, &config, now);
        ballot.body.state = BallotState::Sign;
        ballot.body.signer = signer.address();
        ballot.hash = ballot.body.hash();
        ballot.signature = signer.sign(&config.network_id, &ballot.hash);
        assert!(is_well_formed(&ballot, &config, now, &signer.public_key(), None).is_ok());
    }
}
