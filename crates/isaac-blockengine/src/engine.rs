//! Deterministic block construction from a confirmed ballot.
//!
//! `finish_ballot` resolves every proposed transaction from the pool in
//! ballot order, applies each operation's effect into a batch overlay, and
//! commits the whole round as one atomic write. Transaction order and
//! per-transaction operation order are preserved exactly as proposed, so
//! two nodes applying the same (ballot, pool snapshot) pair always produce
//! the same block hash and the same ordered set of storage writes.

use std::collections::HashSet;

use isaac_ledger::{
    keys, Account, Ballot, Block, BlockTransaction, LedgerError, Operation, Payable,
    Transaction, TransactionHistory,
};
use isaac_storage::{Batch, KeyValueStore, StorageError};
use isaac_txpool::TransactionPool;
use isaac_types::{Address, Timestamp};
use tracing::{debug, instrument};

use crate::config::BlockEngineConfig;
use crate::errors::FinishBallotError;

pub(crate) fn corrupt(context: &str, err: serde_json::Error) -> FinishBallotError {
    StorageError::Corruption(format!("{context}: {err}")).into()
}

fn read_account<S: KeyValueStore + ?Sized>(
    store: &S,
    batch: &Batch,
    address: &Address,
) -> Result<Option<Account>, FinishBallotError> {
    if let Some(account) = batch.get::<Account>(address)? {
        return Ok(Some(account.clone()));
    }
    match store.get(&keys::account(address))? {
        Some(bytes) => {
            let account = serde_json::from_slice(&bytes).map_err(|e| corrupt("account record", e))?;
            Ok(Some(account))
        }
        None => Ok(None),
    }
}

fn require_account<S: KeyValueStore + ?Sized>(
    store: &S,
    batch: &Batch,
    address: &Address,
) -> Result<Account, FinishBallotError> {
    read_account(store, batch, address)?
        .ok_or_else(|| LedgerError::BlockAccountDoesNotExist(address.clone()).into())
}

/// Applies one operation's balance effect into the batch overlay, staging
/// the touched address's secondary index on creation. `touched` accumulates
/// every address whose account instance was written, so the caller can
/// write each one through to storage exactly once at the end of the round.
fn apply_operation<S: KeyValueStore + ?Sized>(
    store: &S,
    batch: &mut Batch,
    op: &Operation,
    height: u64,
    created: Timestamp,
    config: &BlockEngineConfig,
    touched: &mut HashSet<Address>,
) -> Result<(), FinishBallotError> {
    match op {
        Operation::CreateAccount { target, amount, linked } => {
            if read_account(store, batch, target)?.is_some() {
                return Err(LedgerError::BlockAccountAlreadyExists(target.clone()).into());
            }
            if amount.value() < config.base_reserve.value() {
                return Err(LedgerError::InsufficientAmountNewAccount.into());
            }
            let account = Account::new(target.clone(), *amount, linked.clone(), created);
            batch.put(
                keys::account_by_created(created, isaac_ledger::transaction::new_disambiguator()),
                target.clone().into_bytes(),
            );
            batch.set(target.clone(), account);
            touched.insert(target.clone());
            Ok(())
        }
        Operation::Payment { .. } | Operation::CollectTxFee { .. } | Operation::Inflation { .. } => {
            let payable = op.as_payable().expect("variant carries a payable target/amount");
            if matches!(op, Operation::Inflation { .. }) && height > config.block_height_end_of_inflation {
                return Ok(());
            }
            if payable.amount().value() == 0 {
                return Ok(());
            }
            let mut account = require_account(store, batch, payable.target())?;
            account.deposit(payable.amount())?;
            let target = payable.target().clone();
            batch.set(target.clone(), account);
            touched.insert(target);
            Ok(())
        }
        Operation::UnfreezeRequest { .. } => {
            debug!("unfreeze request recorded, no balance effect in this version");
            Ok(())
        }
        Operation::CongressVoting | Operation::CongressVotingResult => Ok(()),
    }
}

/// Turns a confirmed ballot into a persisted block.
///
/// Resubmitting the same ballot is idempotent: if height `blk.height()` was
/// already committed with this exact hash, `AlreadySaved` is returned rather
/// than reapplying the round; a different hash at the same height is a
/// genuine collision and fails with `BlockAlreadyExists`.
#[instrument(skip(ballot, pool, store, config), fields(height = ballot.body.round.block_height, round = ballot.body.round.number))]
pub fn finish_ballot<S: KeyValueStore + ?Sized>(
    ballot: &Ballot,
    pool: &TransactionPool,
    store: &mut S,
    config: &BlockEngineConfig,
) -> Result<Block, FinishBallotError> {
    let mut transactions: Vec<Transaction> = Vec::with_capacity(ballot.body.proposed.transactions.len());
    for hash in &ballot.body.proposed.transactions {
        let tx = pool
            .get(hash)
            .ok_or_else(|| LedgerError::TransactionNotFound(*hash))?;
        transactions.push(tx);
    }

    let blk = Block::new(
        ballot.body.round.block_height,
        ballot.body.round.block_hash,
        ballot.body.round.number,
        ballot.body.proposer.clone(),
        ballot.body.proposed.proposer_transaction.hash,
        ballot.body.proposed.transactions.clone(),
        ballot.body.proposed.confirmed,
    );

    if let Some(existing_bytes) = store.get(&keys::block_by_height(blk.height()))? {
        let existing: Block =
            serde_json::from_slice(&existing_bytes).map_err(|e| corrupt("block-by-height record", e))?;
        if existing.hash == blk.hash {
            return Err(LedgerError::AlreadySaved.into());
        }
        return Err(LedgerError::BlockAlreadyExists(blk.hash).into());
    }

    debug!(block_hash = %blk.hash, total_txs = blk.total_txs(), "constructed block");

    let mut batch = Batch::new();
    let encoded_block = serde_json::to_vec(&blk).expect("block is serializable");
    batch.put(keys::block(&blk.hash), encoded_block.clone());
    batch.put(keys::block_by_height(blk.height()), encoded_block);

    let mut touched: HashSet<Address> = HashSet::new();

    for tx in &transactions {
        let bt = BlockTransaction::from_transaction(blk.hash, blk.height(), blk.confirmed, tx);
        batch.put(
            keys::block_transaction(&tx.hash),
            serde_json::to_vec(&bt).expect("block transaction is serializable"),
        );

        batch.put(
            keys::block_transaction_by_source(
                &tx.body.source,
                blk.height(),
                tx.body.sequence_id,
                isaac_ledger::transaction::new_disambiguator(),
            ),
            tx.hash.to_string().into_bytes(),
        );
        batch.put(
            keys::block_transaction_by_confirmed(blk.confirmed, isaac_ledger::transaction::new_disambiguator()),
            tx.hash.to_string().into_bytes(),
        );
        batch.put(
            keys::block_transaction_by_block(
                &blk.hash,
                blk.height(),
                tx.body.sequence_id,
                isaac_ledger::transaction::new_disambiguator(),
            ),
            tx.hash.to_string().into_bytes(),
        );
        let mut indexed_accounts = bt.payable_targets()?;
        indexed_accounts.push(tx.body.source.clone());
        indexed_accounts.sort();
        indexed_accounts.dedup();
        for account in indexed_accounts {
            batch.put(
                keys::block_transaction_by_account(
                    &account,
                    blk.height(),
                    tx.body.sequence_id,
                    isaac_ledger::transaction::new_disambiguator(),
                ),
                tx.hash.to_string().into_bytes(),
            );
        }

        let expected_sequence = require_account(store, &batch, &tx.body.source)?.sequence_id;
        if expected_sequence != tx.body.sequence_id {
            return Err(LedgerError::SequenceMismatch {
                account: tx.body.source.clone(),
                expected: expected_sequence,
                got: tx.body.sequence_id,
            }
            .into());
        }

        for op in &tx.body.operations {
            apply_operation(store, &mut batch, op, blk.height(), blk.confirmed, config, &mut touched)?;
        }

        let total = tx.body.total_amount()?;
        let mut source = require_account(store, &batch, &tx.body.source)?;
        source.withdraw(total, config.base_reserve)?;
        source.bump_sequence();
        batch.set(tx.body.source.clone(), source);
        touched.insert(tx.body.source.clone());

        let history = TransactionHistory {
            hash: tx.hash,
            source: tx.body.source.clone(),
            confirmed: blk.confirmed,
            created: tx.created,
            message: serde_json::to_vec(tx).expect("transaction is serializable"),
            error: None,
        };
        batch.put(
            keys::transaction_history(&tx.hash),
            serde_json::to_vec(&history).expect("transaction history is serializable"),
        );
    }

    let ptx = &ballot.body.proposed.proposer_transaction;
    apply_operation(
        store,
        &mut batch,
        &ptx.body.collect_tx_fee,
        blk.height(),
        blk.confirmed,
        config,
        &mut touched,
    )?;
    apply_operation(
        store,
        &mut batch,
        &ptx.body.inflation,
        blk.height(),
        blk.confirmed,
        config,
        &mut touched,
    )?;
    batch.put(
        keys::block_transaction(&ptx.hash),
        serde_json::to_vec(ptx).expect("proposer transaction is serializable"),
    );

    for address in touched {
        if let Some(account) = batch.get::<Account>(&address)? {
            let encoded = serde_json::to_vec(account).expect("account is serializable");
            batch.put(keys::account(&address), encoded);
        }
    }

    batch.write(store)?;
    Ok(blk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isaac_crypto::KeyPair;
    use isaac_ledger::ballot::{BallotBody, BallotState, Proposed, Round, Vote};
    use isaac_ledger::proposer_transaction::{ProposerTransaction, ProposerTransactionBody};
    use isaac_ledger::{genesis, TransactionBody};
    use isaac_storage::InMemoryStore;
    use isaac_types::{Amount, Hash};

    struct Fixture {
        store: InMemoryStore,
        pool: TransactionPool,
        proposer: KeyPair,
        genesis_tx_source: Address,
        common: Address,
    }

    fn setup(genesis_balance: u64) -> Fixture {
        let mut store = InMemoryStore::new();
        let genesis_keypair = KeyPair::generate();
        let genesis_source = genesis_keypair.address();
        let common = "common-account".to_string();
        let genesis_tx = genesis::genesis_transaction(
            &genesis_keypair,
            b"net",
            genesis_source.clone(),
            common.clone(),
            Amount::new(genesis_balance),
            Timestamp::from_nanos(0),
        );
        let genesis_blk = genesis::genesis_block(&genesis_keypair, &genesis_tx, Timestamp::from_nanos(0));

        let mut batch = Batch::new();
        let encoded = serde_json::to_vec(&genesis_blk).unwrap();
        batch.put(keys::block(&genesis_blk.hash), encoded.clone());
        batch.put(keys::block_by_height(0), encoded);
        for op in &genesis_tx.body.operations {
            let payable = op.as_payable().unwrap();
            let account = Account::new(payable.target().clone(), payable.amount(), None, Timestamp::from_nanos(0));
            batch.put(keys::account(payable.target()), serde_json::to_vec(&account).unwrap());
        }
        batch.write(&mut store).unwrap();

        Fixture {
            store,
            pool: TransactionPool::new(Default::default()),
            proposer: genesis_keypair,
            genesis_tx_source: genesis_source,
            common,
        }
    }

    fn sample_ballot(fixture: &Fixture, transactions: Vec<Hash>, total_fees: Amount) -> Ballot {
        let ptx_body = ProposerTransactionBody::new(
            fixture.proposer.address(),
            1,
            fixture.common.clone(),
            total_fees,
            Amount::new(5),
        );
        let ptx = ProposerTransaction::new_signed(&fixture.proposer, b"net", ptx_body, Timestamp::from_nanos(0));
        let body = BallotBody {
            signer: fixture.proposer.address(),
            proposer: fixture.proposer.address(),
            round: Round {
                number: 0,
                block_height: 1,
                block_hash: Hash::from_bytes([0; 32]),
                total_txs: transactions.len() as u64,
            },
            state: BallotState::AllConfirm,
            vote: Vote::Yes,
            proposed: Proposed {
                transactions,
                proposer_transaction: ptx,
                confirmed: Timestamp::from_nanos(0),
            },
            confirmed: Timestamp::from_nanos(0),
        };
        let hash = body.hash();
        let signature = fixture.proposer.sign(b"net", &hash);
        Ballot { hash, signature, body }
    }

    #[test]
    fn happy_path_creates_the_target_account_and_debits_the_source() {
        let mut fixture = setup(10_000);
        let target = "fresh-target".to_string();
        let tx_body = TransactionBody {
            source: fixture.genesis_tx_source.clone(),
            fee: Amount::new(10),
            sequence_id: 0,
            operations: vec![Operation::CreateAccount {
                target: target.clone(),
                amount: Amount::new(1_000),
                linked: None,
            }],
        };
        let tx = Transaction::new_signed(&fixture.proposer, b"net", tx_body, Timestamp::from_nanos(0));
        fixture.pool.add(tx.clone()).unwrap();

        let ballot = sample_ballot(&fixture, vec![tx.hash], Amount::new(10));
        let config = BlockEngineConfig::default();
        let blk = finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config).unwrap();
        assert_eq!(blk.height(), 1);

        let target_bytes = fixture.store.get(&keys::account(&target)).unwrap().unwrap();
        let target_account: Account = serde_json::from_slice(&target_bytes).unwrap();
        assert_eq!(target_account.balance, Amount::new(1_000));

        let source_bytes = fixture
            .store
            .get(&keys::account(&fixture.genesis_tx_source))
            .unwrap()
            .unwrap();
        let source_account: Account = serde_json::from_slice(&source_bytes).unwrap();
        assert_eq!(source_account.balance, Amount::new(10_000 - 1_010));
        assert_eq!(source_account.sequence_id, 1);
    }

    #[test]
    fn missing_transaction_fails_before_any_write() {
        let mut fixture = setup(10_000);
        let ghost_hash = Hash::from_bytes([9; 32]);
        let ballot = sample_ballot(&fixture, vec![ghost_hash], Amount::ZERO);
        let config = BlockEngineConfig::default();
        let result = finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config);
        assert!(matches!(
            result,
            Err(FinishBallotError::Ledger(LedgerError::TransactionNotFound(_)))
        ));
        assert!(fixture.store.get(&keys::block_by_height(1)).unwrap().is_none());
    }

    #[test]
    fn insufficient_balance_aborts_without_a_partial_write() {
        let mut fixture = setup(100);
        let target = "overdrawn-target".to_string();
        let tx_body = TransactionBody {
            source: fixture.genesis_tx_source.clone(),
            fee: Amount::new(1),
            sequence_id: 0,
            operations: vec![Operation::CreateAccount {
                target: target.clone(),
                amount: Amount::new(1_000),
                linked: None,
            }],
        };
        let tx = Transaction::new_signed(&fixture.proposer, b"net", tx_body, Timestamp::from_nanos(0));
        fixture.pool.add(tx.clone()).unwrap();

        let ballot = sample_ballot(&fixture, vec![tx.hash], Amount::new(1));
        let config = BlockEngineConfig::default();
        let result = finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config);
        assert!(matches!(
            result,
            Err(FinishBallotError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        assert!(fixture.store.get(&keys::account(&target)).unwrap().is_none());
    }

    #[test]
    fn an_out_of_order_sequence_id_is_rejected_without_a_partial_write() {
        let mut fixture = setup(10_000);
        let tx_body = TransactionBody {
            source: fixture.genesis_tx_source.clone(),
            fee: Amount::new(10),
            sequence_id: 7,
            operations: vec![Operation::Payment {
                target: fixture.common.clone(),
                amount: Amount::new(100),
            }],
        };
        let tx = Transaction::new_signed(&fixture.proposer, b"net", tx_body, Timestamp::from_nanos(0));
        fixture.pool.add(tx.clone()).unwrap();

        let ballot = sample_ballot(&fixture, vec![tx.hash], Amount::new(10));
        let config = BlockEngineConfig::default();
        let result = finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config);
        assert!(matches!(
            result,
            Err(FinishBallotError::Ledger(LedgerError::SequenceMismatch { expected: 0, got: 7, .. }))
        ));
        assert!(fixture.store.get(&keys::block_by_height(1)).unwrap().is_none());
    }

    #[test]
    fn resubmitting_the_same_ballot_is_reported_as_already_saved() {
        let mut fixture = setup(10_000);
        let target = "fresh-target".to_string();
        let tx_body = TransactionBody {
            source: fixture.genesis_tx_source.clone(),
            fee: Amount::new(10),
            sequence_id: 0,
            operations: vec![Operation::CreateAccount {
                target,
                amount: Amount::new(1_000),
                linked: None,
            }],
        };
        let tx = Transaction::new_signed(&fixture.proposer, b"net", tx_body, Timestamp::from_nanos(0));
        fixture.pool.add(tx.clone()).unwrap();
        let ballot = sample_ballot(&fixture, vec![tx.hash], Amount::new(10));
        let config = BlockEngineConfig::default();
        finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config).unwrap();

        let result = finish_ballot(&ballot, &fixture.pool, &mut fixture.store, &config);
        assert!(matches!(result, Err(FinishBallotError::Ledger(LedgerError::AlreadySaved))));
    }
}
