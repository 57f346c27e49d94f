//! The round-driving loop: turns `NodeConfig` plus a keypair into a running
//! validator that proposes or votes on ballots, drives them through
//! `isaac_consensus::isaac::RoundState`, and hands concluded ballots to
//! `isaac_blockengine::finish_ballot`.
//!
//! Wire reception of peer ballots is the one piece this crate cannot own —
//! `spec.md`'s network-transport Non-goal means there is no socket layer in
//! this workspace. [`Node::inbound_sender`] is the seam: whatever transport
//! a deployment plugs in feeds received ballots through that channel, and
//! this loop drains it the same way regardless of whether the sender is a
//! real peer connection or, as in every test here, a single validator
//! feeding itself.

use std::sync::Arc;
use std::time::Duration;

use isaac_blockengine::{bootstrap_genesis, finish_ballot, BlockEngineConfig};
use isaac_consensus::isaac::{select_proposer, RoundOutcome, RoundState};
use isaac_consensus::validation::is_well_formed;
use isaac_consensus::ConsensusConfig;
use isaac_crypto::{KeyPair, PublicKey};
use isaac_eventbus::{EventPublisher, InMemoryEventBus, LedgerEvent};
use isaac_ledger::{
    keys, Account, Ballot, BallotBody, BallotState, Block, LedgerError, ProposerTransaction,
    ProposerTransactionBody, Proposed, Round, Vote,
};
use isaac_network::{ConnectionManager, PeerTransport};
use isaac_storage::{InMemoryStore, KeyValueStore};
use isaac_txpool::TransactionPool;
use isaac_types::{Address, Amount, Timestamp};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::container::config::NodeConfig;
use crate::errors::NodeError;

fn corrupt(context: &str, err: serde_json::Error) -> NodeError {
    isaac_storage::StorageError::Corruption(format!("{context}: {err}")).into()
}

/// A running validator: owns the store, the pool, the roster, and the
/// per-round state machine driving them.
pub struct Node<T: PeerTransport + 'static> {
    config: NodeConfig,
    keypair: KeyPair,
    network_id: Vec<u8>,
    store: InMemoryStore,
    pool: Arc<TransactionPool>,
    consensus_config: ConsensusConfig,
    engine_config: BlockEngineConfig,
    connection_manager: ConnectionManager<T>,
    events: Option<Arc<InMemoryEventBus>>,
    inbound_tx: mpsc::Sender<Ballot>,
    inbound_rx: mpsc::Receiver<Ballot>,
    height: u64,
    round_number: u64,
}

impl<T: PeerTransport + 'static> Node<T> {
    pub fn new(config: NodeConfig, keypair: KeyPair, transport: Arc<T>) -> Self {
        config.validate();
        let network_id = config.genesis.network_id.as_bytes().to_vec();
        let consensus_config = config.consensus_config();
        let engine_config = BlockEngineConfig {
            base_reserve: Amount::new(config.tx.base_reserve),
            block_height_end_of_inflation: config.inflation.block_height_end_of_inflation,
        };
        let connection_manager = ConnectionManager::new(transport, network_id.clone());
        connection_manager.roster().upsert(keypair.address(), "self".to_string());
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let pool = Arc::new(TransactionPool::new(config.pool_limits()));

        Node {
            config,
            keypair,
            network_id,
            store: InMemoryStore::new(),
            pool,
            consensus_config,
            engine_config,
            connection_manager,
            events: None,
            inbound_tx,
            inbound_rx,
            height: 0,
            round_number: 0,
        }
    }

    /// Attaches a post-commit event bus; every committed block publishes a
    /// [`LedgerEvent::BlockCommitted`] once this is set.
    #[must_use]
    pub fn with_events(mut self, events: Arc<InMemoryEventBus>) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<TransactionPool> {
        &self.pool
    }

    /// A sender the transport layer feeds ballots received from peers into.
    #[must_use]
    pub fn inbound_sender(&self) -> mpsc::Sender<Ballot> {
        self.inbound_tx.clone()
    }

    /// Registers another validator in the roster with a live endpoint. A
    /// solo node never needs this; a multi-validator deployment calls it
    /// once per peer after the transport layer's handshake succeeds.
    pub fn add_validator(&self, address: Address, endpoint: String) {
        self.connection_manager.roster().upsert(address, endpoint);
    }

    /// Idempotently writes the genesis block if the store doesn't have one
    /// yet, and sets this node's working height to the block that follows.
    pub fn bootstrap(&mut self) -> Result<Block, NodeError> {
        let block = bootstrap_genesis(
            &mut self.store,
            &self.keypair,
            &self.network_id,
            self.config.genesis.genesis_account.clone(),
            self.config.genesis.common_account.clone(),
            Amount::new(self.config.genesis.initial_balance),
            Timestamp::now(),
        )?;
        self.height = block.height() + 1;
        Ok(block)
    }

    /// Reads an account's balance straight from the store, `Amount::ZERO`
    /// if it has never been created. Useful for tests and operator tooling;
    /// the round-driving loop itself only needs the common account's.
    pub fn account_balance(&self, address: &Address) -> Result<Amount, NodeError> {
        match self.store.get(&keys::account(address))? {
            Some(bytes) => {
                let account: Account = serde_json::from_slice(&bytes).map_err(|e| corrupt("account record", e))?;
                Ok(account.balance)
            }
            None => Ok(Amount::ZERO),
        }
    }

    fn common_account_balance(&self) -> Result<Amount, NodeError> {
        self.account_balance(&self.config.genesis.common_account)
    }

    /// Builds this round's proposal: the pool transactions a proposer would
    /// offer, and the proposer transaction collecting their fees plus this
    /// round's inflation.
    fn build_proposed(&self, height: u64) -> Result<Proposed, NodeError> {
        let hashes = self.pool.available(self.config.pool.txs_limit);
        let mut total_fees = Amount::ZERO;
        for hash in &hashes {
            if let Some(tx) = self.pool.get(hash) {
                total_fees = total_fees
                    .checked_add(tx.body.fee)
                    .ok_or(LedgerError::OperationAmountUnderflow)?;
            }
        }
        let common_balance = self.common_account_balance()?;
        let inflation_amount = self.config.inflation.amount_for(height, common_balance);
        let body = ProposerTransactionBody::new(
            self.address(),
            height,
            self.config.genesis.common_account.clone(),
            total_fees,
            inflation_amount,
        );
        let proposer_transaction = ProposerTransaction::new_signed(&self.keypair, &self.network_id, body, Timestamp::now());
        Ok(Proposed {
            transactions: hashes,
            proposer_transaction,
            confirmed: Timestamp::now(),
        })
    }

    fn sign_ballot(&self, proposer: Address, round: Round, state: BallotState, vote: Vote, proposed: Proposed) -> Ballot {
        let body = BallotBody {
            signer: self.address(),
            proposer,
            round,
            state,
            vote,
            proposed,
            confirmed: Timestamp::now(),
        };
        let hash = body.hash();
        let signature = self.keypair.sign(&self.network_id, &hash);
        Ballot { hash, signature, body }
    }

    /// Decides this validator's vote on a proposal per the SIGN-phase rule:
    /// YES iff every proposed transaction is present in the pool, no two
    /// share a source, none self-targets, every operation is well-formed,
    /// and each source's sequence-id matches its account's next expected
    /// value; NO otherwise.
    fn decide_vote(&self, proposed: &Proposed) -> Vote {
        let mut seen_sources: std::collections::HashSet<Address> = std::collections::HashSet::new();
        for hash in &proposed.transactions {
            let Some(tx) = self.pool.get(hash) else {
                warn!(%hash, "proposed transaction missing from the pool, voting NO");
                return Vote::No;
            };
            if !seen_sources.insert(tx.body.source.clone()) {
                warn!(source = %tx.body.source, "two proposed transactions share a source, voting NO");
                return Vote::No;
            }
            if let Err(err) = tx.body.check_no_self_targeting() {
                warn!(%err, hash = %tx.hash, "proposed transaction is self-targeting, voting NO");
                return Vote::No;
            }
            if let Some(err) = tx.body.operations.iter().find_map(|op| op.check_well_formed().err()) {
                warn!(%err, hash = %tx.hash, "proposed transaction carries a malformed operation, voting NO");
                return Vote::No;
            }
            let account = match self.store.get(&keys::account(&tx.body.source)) {
                Ok(Some(bytes)) => match serde_json::from_slice::<Account>(&bytes) {
                    Ok(account) => account,
                    Err(err) => {
                        warn!(%err, "account record is corrupt, voting NO");
                        return Vote::No;
                    }
                },
                Ok(None) => {
                    warn!(source = %tx.body.source, "proposed transaction's source has no account, voting NO");
                    return Vote::No;
                }
                Err(err) => {
                    warn!(%err, "failed to read account while validating sequence-id, voting NO");
                    return Vote::No;
                }
            };
            if !account.accepts_sequence(tx.body.sequence_id) {
                warn!(
                    source = %tx.body.source,
                    expected = account.sequence_id,
                    got = tx.body.sequence_id,
                    "sequence-id mismatch, voting NO"
                );
                return Vote::No;
            }
        }
        Vote::Yes
    }

    fn validate_inbound(&self, ballot: &Ballot) -> Result<(), NodeError> {
        let signer_key = PublicKey::from_address(&ballot.body.signer)?;
        is_well_formed(ballot, &self.consensus_config, Timestamp::now(), &signer_key, None)?;
        Ok(())
    }

    async fn broadcast(&self, ballot: &Ballot) {
        match serde_json::to_vec(ballot) {
            Ok(payload) => {
                let report = self.connection_manager.broadcast(payload).await;
                if !report.failed.is_empty() {
                    warn!(failed = report.failed.len(), "ballot broadcast had failures");
                }
            }
            Err(err) => warn!(%err, "failed to encode ballot for broadcast"),
        }
    }

    /// Runs one phase: casts this validator's own vote, then drains
    /// `inbound` (waiting up to the phase's timeout) until quorum is
    /// reached or the phase expires.
    async fn run_phase(&mut self, round_state: &mut RoundState, self_ballot: Ballot) -> Result<RoundOutcome, NodeError> {
        self.broadcast(&self_ballot).await;
        let connected = self.connection_manager.roster().connected_count();
        let mut outcome = round_state.record(&self_ballot, &self.consensus_config, connected)?;

        if outcome != RoundOutcome::Pending {
            return Ok(outcome);
        }

        let phase_timeout = round_state.phase_timeout(&self.consensus_config);
        let deadline = tokio::time::sleep(phase_timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => {
                    outcome = RoundOutcome::Expired;
                    break;
                }
                received = self.inbound_rx.recv() => {
                    match received {
                        Some(ballot) => {
                            if let Err(err) = self.validate_inbound(&ballot) {
                                warn!(%err, "dropping malformed inbound ballot");
                                continue;
                            }
                            match round_state.record(&ballot, &self.consensus_config, connected) {
                                Ok(next) => {
                                    outcome = next;
                                    if outcome != RoundOutcome::Pending {
                                        break;
                                    }
                                }
                                Err(err) => warn!(%err, "dropping ballot rejected by the round state machine"),
                            }
                        }
                        None => {
                            outcome = RoundOutcome::Expired;
                            break;
                        }
                    }
                }
            }
        }
        Ok(outcome)
    }

    /// Drives (height, round_number) through INIT → SIGN → ACCEPT →
    /// ALL-CONFIRM, retrying with a rotated proposer on every expiry, then
    /// commits the resulting block. Blocks the caller until one block is
    /// committed.
    #[instrument(skip(self), fields(height = self.height))]
    pub async fn run_one_round(&mut self) -> Result<Block, NodeError> {
        let height = self.height;
        let mut retries = 0u32;

        loop {
            let validators = self.connection_manager.roster().all();
            let proposer =
                select_proposer(&validators, height, self.round_number).ok_or_else(|| NodeError::SelfNotInRoster(self.address()))?;
            let is_proposer = proposer == self.address();

            if !is_proposer {
                // Waiting for a remote proposer's INIT ballot is a transport
                // concern this workspace does not implement; a watcher or
                // non-proposer validator would block here on `inbound_rx`.
                // Solo deployments are always the proposer, so this arm
                // exists for roster completeness rather than being exercised.
                warn!(%proposer, "not this round's proposer and no peer transport is wired in; expiring the round");
                self.round_number += 1;
                retries += 1;
            } else {
                let proposed = self.build_proposed(height)?;
                let round = Round {
                    number: self.round_number,
                    block_height: height,
                    block_hash: proposed.proposer_transaction.hash,
                    total_txs: proposed.transactions.len() as u64,
                };
                let mut round_state = RoundState::new(height, self.round_number, Duration::ZERO);
                let vote = self.decide_vote(&proposed);

                let mut phase = BallotState::Init;
                let mut concluded_ballot = None;
                loop {
                    let ballot = self.sign_ballot(proposer.clone(), round.clone(), phase, vote, proposed.clone());
                    match self.run_phase(&mut round_state, ballot.clone()).await? {
                        RoundOutcome::Advanced(next) => phase = next,
                        RoundOutcome::Concluded => {
                            concluded_ballot = Some(ballot);
                            break;
                        }
                        RoundOutcome::Expired => break,
                        RoundOutcome::Pending => unreachable!("run_phase only returns once the phase has resolved"),
                    }
                }

                if let Some(ballot) = concluded_ballot {
                    let block = finish_ballot(&ballot, &self.pool, &mut self.store, &self.engine_config)?;
                    for hash in &ballot.body.proposed.transactions {
                        self.pool.remove(hash);
                    }
                    if let Some(events) = &self.events {
                        events.publish(LedgerEvent::BlockCommitted { block: block.clone() }).await;
                    }
                    info!(height = block.height(), hash = ?block.hash, "committed block");
                    self.height = block.height() + 1;
                    self.round_number = 0;
                    return Ok(block);
                }

                self.round_number += 1;
                retries += 1;
            }

            if retries > 0 && retries % 8 == 0 {
                warn!(height, round = self.round_number, retries, "round repeatedly failing to reach quorum");
            }
        }
    }

    /// Runs rounds forever, pausing `block_time` between each committed
    /// block. Intended for `main`; callers that want fine-grained control
    /// over shutdown should drive [`Node::run_one_round`] directly instead.
    pub async fn run(&mut self) -> Result<(), NodeError> {
        let block_time = self.consensus_config.block_time;
        loop {
            self.run_one_round().await?;
            tokio::time::sleep(block_time).await;
        }
    }
}
