//! The shared wire envelope and handshake message, used by both the network
//! and consensus crates so they never define two copies of the same shape.

use isaac_crypto::{KeyPair, PublicKey, Signature};
use isaac_types::{hash_of, Address, Hash};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// The signed header every wire message carries: the canonical hash of its
/// body, and a signature over `network_id ‖ hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "Hash")]
    pub hash: Hash,
    #[serde(rename = "Signature")]
    pub signature: Signature,
}

/// A signed wire message: `{H: header, B: body}`. `B` is whatever payload the
/// caller is sending — a [`ConnectMessage`], a `Transaction`, or a `Ballot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<B> {
    #[serde(rename = "H")]
    pub header: Header,
    #[serde(rename = "B")]
    pub body: B,
}

impl<B: Serialize> Envelope<B> {
    /// Signs `body` as `signer`, computing the header's hash and signature.
    pub fn sign(keypair: &KeyPair, network_id: &[u8], body: B) -> Self {
        let hash = hash_of(&body);
        let signature = keypair.sign(network_id, &hash);
        Envelope {
            header: Header { hash, signature },
            body,
        }
    }

    /// Verifies the header's hash matches the body and the signature is
    /// `signer`'s.
    pub fn verify(&self, network_id: &[u8], signer: &PublicKey) -> Result<(), LedgerError> {
        if hash_of(&self.body) != self.header.hash {
            return Err(LedgerError::BadSignature(
                "envelope hash does not match its body".to_string(),
            ));
        }
        signer
            .verify(network_id, &self.header.hash, &self.header.signature)
            .map_err(|e| LedgerError::BadSignature(e.to_string()))
    }
}

/// The handshake message exchanged when a node connects to a peer. Responses
/// carry the peer's own validator list so newly introduced endpoints
/// propagate through the network without a separate discovery message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectMessage {
    #[serde(rename = "Created")]
    pub created: isaac_types::Timestamp,
    #[serde(rename = "Address")]
    pub address: Address,
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
    #[serde(rename = "Validators")]
    pub validators: Vec<Address>,
}
