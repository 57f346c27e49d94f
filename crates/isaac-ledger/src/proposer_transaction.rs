//! The proposer transaction: fee collection and inflation, bundled by the
//! round's proposer and carried inside a ballot rather than the pool.

use isaac_crypto::{KeyPair, PublicKey, Signature};
use isaac_types::{hash_of, Address, Amount, Hash, Timestamp};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::operation::Operation;

/// The signable body of a [`ProposerTransaction`]: exactly `CollectTxFee`
/// followed by `Inflation`, both targeting the common account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposerTransactionBody {
    pub proposer: Address,
    pub block_height: u64,
    pub collect_tx_fee: Operation,
    pub inflation: Operation,
}

impl ProposerTransactionBody {
    /// Builds the body, failing if the operations aren't the required shape.
    pub fn new(
        proposer: Address,
        block_height: u64,
        common_account: Address,
        total_fees: Amount,
        inflation_amount: Amount,
    ) -> Self {
        ProposerTransactionBody {
            proposer,
            block_height,
            collect_tx_fee: Operation::CollectTxFee {
                target: common_account.clone(),
                amount: total_fees,
            },
            inflation: Operation::Inflation {
                target: common_account,
                amount: inflation_amount,
            },
        }
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        hash_of(self)
    }

    /// Structural check that the two operations are in the order the
    /// protocol requires: `CollectTxFee` then `Inflation`.
    pub fn check_shape(&self) -> Result<(), LedgerError> {
        match (&self.collect_tx_fee, &self.inflation) {
            (Operation::CollectTxFee { .. }, Operation::Inflation { .. }) => Ok(()),
            _ => Err(LedgerError::UnknownOperationType(
                "proposer transaction must be CollectTxFee then Inflation".to_string(),
            )),
        }
    }
}

/// The proposer transaction, independently signed by the proposer (see
/// `ProposerTransaction::verify`) — its signature is separate from the
/// enclosing ballot's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposerTransaction {
    pub hash: Hash,
    pub signature: Signature,
    pub created: Timestamp,
    pub body: ProposerTransactionBody,
}

impl ProposerTransaction {
    #[must_use]
    pub fn new_signed(keypair: &KeyPair, network_id: &[u8], body: ProposerTransactionBody, created: Timestamp) -> Self {
        let hash = body.hash();
        let signature = keypair.sign(network_id, &hash);
        ProposerTransaction {
            hash,
            signature,
            created,
            body,
        }
    }

    /// Verifies the hash matches the body and the signature is the
    /// proposer's, independent of any ballot-level signature.
    pub fn verify(&self, network_id: &[u8], proposer_key: &PublicKey) -> Result<(), LedgerError> {
        if self.body.hash() != self.hash {
            return Err(LedgerError::BadSignature(
                "proposer transaction hash does not match its body".to_string(),
            ));
        }
        self.body.check_shape()?;
        proposer_key
            .verify(network_id, &self.hash, &self.signature)
            .map_err(|e| LedgerError::BadSignature(e.to_string()))
    }
}
