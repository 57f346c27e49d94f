//! Transactions and their storage-layer shadow records.

use isaac_crypto::{KeyPair, PublicKey, Signature};
use isaac_types::{hash_of, Address, Amount, Hash, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::operation::{Operation, Payable};

/// The signable part of a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub source: Address,
    pub fee: Amount,
    pub sequence_id: u64,
    pub operations: Vec<Operation>,
}

impl TransactionBody {
    #[must_use]
    pub fn hash(&self) -> Hash {
        hash_of(self)
    }

    /// The total amount this transaction withdraws from its source: every
    /// operation's amount (for the variants that carry one) plus the fee.
    pub fn total_amount(&self) -> Result<Amount, LedgerError> {
        let operation_amounts = self
            .operations
            .iter()
            .filter_map(|op| op.as_payable().map(|p| p.amount()));
        let sum = Amount::checked_sum(operation_amounts)?;
        Ok(sum.add(self.fee)?)
    }

    /// No operation may target the source itself — a transaction cannot pay
    /// or create-account into its own address.
    pub fn check_no_self_targeting(&self) -> Result<(), LedgerError> {
        for op in &self.operations {
            if let Some(payable) = op.as_payable() {
                use crate::operation::Payable;
                if payable.target() == &self.source {
                    return Err(LedgerError::SelfTargetingOperation);
                }
            }
        }
        Ok(())
    }
}

/// A client-submitted transaction: a hash/signature/created header over a
/// signable body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub signature: Signature,
    pub created: Timestamp,
    pub body: TransactionBody,
}

impl Transaction {
    /// Builds and signs a transaction as its source.
    #[must_use]
    pub fn new_signed(
        keypair: &KeyPair,
        network_id: &[u8],
        body: TransactionBody,
        created: Timestamp,
    ) -> Self {
        let hash = body.hash();
        let signature = keypair.sign(network_id, &hash);
        Transaction {
            hash,
            signature,
            created,
            body,
        }
    }

    /// Recomputes the body hash and checks it matches the header, then
    /// verifies the signature over it for `source_key`.
    pub fn verify(&self, network_id: &[u8], source_key: &PublicKey) -> Result<(), LedgerError> {
        if self.body.hash() != self.hash {
            return Err(LedgerError::BadSignature(
                "transaction hash does not match its body".to_string(),
            ));
        }
        source_key
            .verify(network_id, &self.hash, &self.signature)
            .map_err(|e| LedgerError::BadSignature(e.to_string()))
    }
}

/// The storage-layer record for a transaction included in a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub hash: Hash,
    pub block: Hash,
    pub block_height: u64,
    pub confirmed: Timestamp,
    pub message: Vec<u8>,
}

impl BlockTransaction {
    #[must_use]
    pub fn from_transaction(block: Hash, block_height: u64, confirmed: Timestamp, tx: &Transaction) -> Self {
        BlockTransaction {
            hash: tx.hash,
            block,
            block_height,
            confirmed,
            message: serde_json::to_vec(tx).expect("transaction is serializable"),
        }
    }

    /// Every distinct address this transaction's operations pay into,
    /// including the source itself (the source always has an index entry
    /// through `bts-`, covered separately).
    pub fn payable_targets(&self) -> Result<Vec<Address>, LedgerError> {
        let tx: Transaction = serde_json::from_slice(&self.message)
            .map_err(|e| LedgerError::UnknownOperationType(e.to_string()))?;
        use crate::operation::Payable;
        let mut targets: Vec<Address> = tx
            .body
            .operations
            .iter()
            .filter_map(|op| op.as_payable().map(|p| p.target().clone()))
            .collect();
        targets.sort();
        targets.dedup();
        Ok(targets)
    }
}

/// A per-transaction history entry, written whether the transaction
/// succeeded or failed inside its ballot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub hash: Hash,
    pub source: Address,
    pub confirmed: Timestamp,
    pub created: Timestamp,
    pub message: Vec<u8>,
    /// `None` on success; `Some(reason)` if the transaction failed inside
    /// its ballot and was recorded rather than applied.
    pub error: Option<String>,
}

/// A random disambiguator for a secondary index key. Kept as a thin wrapper
/// so call sites read as intent ("the next index disambiguator") rather than
/// a bare `Uuid::new_v4()`.
#[must_use]
pub fn new_disambiguator() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body(source: &str, sequence_id: u64) -> TransactionBody {
        TransactionBody {
            source: source.to_string(),
            fee: Amount::new(10),
            sequence_id,
            operations: vec![Operation::Payment {
                target: "dest".to_string(),
                amount: Amount::new(100),
            }],
        }
    }

    #[test]
    fn signed_transaction_verifies() {
        let keypair = KeyPair::generate();
        let body = TransactionBody {
            source: keypair.address(),
            ..sample_body(&keypair.address(), 0)
        };
        let tx = Transaction::new_signed(&keypair, b"net", body, Timestamp::from_nanos(0));
        assert!(tx.verify(b"net", &keypair.public_key()).is_ok());
    }

    #[test]
    fn tampering_with_the_body_breaks_verification() {
        let keypair = KeyPair::generate();
        let body = sample_body(&keypair.address(), 0);
        let mut tx = Transaction::new_signed(&keypair, b"net", body, Timestamp::from_nanos(0));
        tx.body.sequence_id = 99;
        assert!(tx.verify(b"net", &keypair.public_key()).is_err());
    }

    #[test]
    fn total_amount_sums_operations_plus_fee() {
        let body = sample_body("source", 0);
        assert_eq!(body.total_amount().unwrap(), Amount::new(110));
    }

    #[test]
    fn self_targeting_operation_is_rejected() {
        let body = TransactionBody {
            source: "addr".to_string(),
            fee: Amount::new(10),
            sequence_id: 0,
            operations: vec![Operation::Payment {
                target: "addr".to_string(),
                amount: Amount::new(5),
            }],
        };
        assert!(body.check_no_self_targeting().is_err());
    }

    #[test]
    fn block_transaction_lists_distinct_payable_targets() {
        let keypair = KeyPair::generate();
        let body = TransactionBody {
            source: keypair.address(),
            fee: Amount::new(10),
            sequence_id: 0,
            operations: vec![
                Operation::Payment {
                    target: "a".to_string(),
                    amount: Amount::new(1),
                },
                Operation::Payment {
                    target: "a".to_string(),
                    amount: Amount::new(2),
                },
            ],
        };
        let tx = Transaction::new_signed(&keypair, b"net", body, Timestamp::from_nanos(0));
        let bt = BlockTransaction::from_transaction(Hash::from_bytes([0; 32]), 1, Timestamp::from_nanos(0), &tx);
        assert_eq!(bt.payable_targets().unwrap(), vec!["a".to_string()]);
    }
}
