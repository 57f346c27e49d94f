//! Genesis bootstrap: writes height 0 the first time a node starts against
//! an empty store, and is a no-op against a store that already has it.

use isaac_crypto::KeyPair;
use isaac_ledger::{genesis, keys, Account, Block, LedgerError, Payable};
use isaac_storage::{Batch, KeyValueStore};
use isaac_types::{Address, Amount, Timestamp};
use tracing::info;

use crate::engine::corrupt;
use crate::errors::FinishBallotError;

/// Writes the genesis block and its two accounts if height 0 is absent.
/// Returns the existing genesis block unchanged if one is already present,
/// rather than erroring — restarting a node against its own data directory
/// must not fail.
pub fn bootstrap_genesis<S: KeyValueStore + ?Sized>(
    store: &mut S,
    keypair: &KeyPair,
    network_id: &[u8],
    genesis_account: Address,
    common_account: Address,
    initial_balance: Amount,
    created: Timestamp,
) -> Result<Block, FinishBallotError> {
    if let Some(bytes) = store.get(&keys::block_by_height(0))? {
        let existing: Block = serde_json::from_slice(&bytes).map_err(|e| corrupt("genesis block record", e))?;
        return Ok(existing);
    }

    let tx = genesis::genesis_transaction(keypair, network_id, genesis_account, common_account, initial_balance, created);
    genesis::validate_genesis_transaction(&tx)?;
    let blk = genesis::genesis_block(keypair, &tx, created);

    let mut batch = Batch::new();
    let encoded_block = serde_json::to_vec(&blk).expect("block is serializable");
    batch.put(keys::block(&blk.hash), encoded_block.clone());
    batch.put(keys::block_by_height(0), encoded_block);

    for op in &tx.body.operations {
        let payable = op
            .as_payable()
            .ok_or_else(|| LedgerError::WrongBlockFound("genesis operation is not payable".to_string()))?;
        let account = Account::new(payable.target().clone(), payable.amount(), None, created);
        batch.put(keys::account(payable.target()), serde_json::to_vec(&account).expect("account is serializable"));
        batch.put(
            keys::account_by_created(created, isaac_ledger::transaction::new_disambiguator()),
            payable.target().clone().into_bytes(),
        );
    }

    batch.write(store)?;
    info!(height = 0, block_hash = %blk.hash, "genesis block written");
    Ok(blk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isaac_storage::InMemoryStore;

    #[test]
    fn bootstrapping_an_empty_store_writes_both_genesis_accounts() {
        let mut store = InMemoryStore::new();
        let keypair = KeyPair::generate();
        let blk = bootstrap_genesis(
            &mut store,
            &keypair,
            b"net",
            "genesis".to_string(),
            "common".to_string(),
            Amount::new(1_000_000),
            Timestamp::from_nanos(0),
        )
        .unwrap();
        assert_eq!(blk.height(), 0);
        assert!(store.get(&keys::account(&"genesis".to_string())).unwrap().is_some());
        assert!(store.get(&keys::account(&"common".to_string())).unwrap().is_some());
    }

    #[test]
    fn bootstrapping_twice_is_idempotent_and_returns_the_same_block() {
        let mut store = InMemoryStore::new();
        let keypair = KeyPair::generate();
        let first = bootstrap_genesis(
            &mut store,
            &keypair,
            b"net",
            "genesis".to_string(),
            "common".to_string(),
            Amount::new(1_000),
            Timestamp::from_nanos(0),
        )
        .unwrap();
        let second = bootstrap_genesis(
            &mut store,
            &keypair,
            b"net",
            "genesis".to_string(),
            "common".to_string(),
            Amount::new(999_999),
            Timestamp::from_nanos(0),
        )
        .unwrap();
        assert_eq!(first.hash, second.hash);
    }
}
