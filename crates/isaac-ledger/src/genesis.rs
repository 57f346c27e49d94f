//! Genesis block construction and validation.
//!
//! Height 0 is special-cased: it holds exactly one transaction with exactly
//! two `CreateAccount` operations, the genesis account followed by the
//! common account. Any other arity at height 0 is rejected rather than
//! quietly accepted, per the two-operation invariant this crate resolves the
//! source's ambiguity with.

use isaac_crypto::KeyPair;
use isaac_types::{Address, Amount, Hash, Timestamp};

use crate::block::Block;
use crate::errors::LedgerError;
use crate::operation::Operation;
use crate::transaction::{Transaction, TransactionBody};

/// Builds the genesis transaction: one `CreateAccount` crediting
/// `genesis_account` with `initial_balance`, followed by one `CreateAccount`
/// crediting `common_account` with zero.
#[must_use]
pub fn genesis_transaction(
    keypair: &KeyPair,
    network_id: &[u8],
    genesis_account: Address,
    common_account: Address,
    initial_balance: Amount,
    created: Timestamp,
) -> Transaction {
    let body = TransactionBody {
        source: keypair.address(),
        fee: Amount::ZERO,
        sequence_id: 0,
        operations: vec![
            Operation::CreateAccount {
                target: genesis_account,
                amount: initial_balance,
                linked: None,
            },
            Operation::CreateAccount {
                target: common_account,
                amount: Amount::ZERO,
                linked: None,
            },
        ],
    };
    Transaction::new_signed(keypair, network_id, body, created)
}

/// Builds the genesis block around a single genesis transaction.
#[must_use]
pub fn genesis_block(keypair: &KeyPair, transaction: &Transaction, confirmed: Timestamp) -> Block {
    Block::new(
        0,
        Hash::from_bytes([0; 32]),
        0,
        keypair.address(),
        transaction.hash,
        vec![transaction.hash],
        confirmed,
    )
}

/// Enforces the genesis arity invariant: exactly two `CreateAccount`
/// operations, in order. Any other shape — one operation, a non-CreateAccount
/// operation, or more than two — fails with `WrongBlockFound`.
pub fn validate_genesis_transaction(tx: &Transaction) -> Result<(), LedgerError> {
    let ops = &tx.body.operations;
    if ops.len() != 2 {
        return Err(LedgerError::WrongBlockFound(format!(
            "genesis transaction must have exactly 2 operations, found {}",
            ops.len()
        )));
    }
    if !matches!(ops[0], Operation::CreateAccount { .. }) || !matches!(ops[1], Operation::CreateAccount { .. }) {
        return Err(LedgerError::WrongBlockFound(
            "genesis transaction operations must both be CreateAccount".to_string(),
        ));
    }
    Ok(())
}

/// Reads the genesis account address from a validated genesis transaction
/// (`operations[0]`'s target).
pub fn genesis_account(tx: &Transaction) -> Result<Address, LedgerError> {
    validate_genesis_transaction(tx)?;
    match &tx.body.operations[0] {
        Operation::CreateAccount { target, .. } => Ok(target.clone()),
        _ => unreachable!("validate_genesis_transaction checked this"),
    }
}

/// Reads the common account address from a validated genesis transaction
/// (`operations[1]`'s target).
pub fn common_account(tx: &Transaction) -> Result<Address, LedgerError> {
    validate_genesis_transaction(tx)?;
    match &tx.body.operations[1] {
        Operation::CreateAccount { target, .. } => Ok(target.clone()),
        _ => unreachable!("validate_genesis_transaction checked this"),
    }
}
