//! Ed25519 keys, signatures, and addresses.
//!
//! Every signed object in the system signs over `network_id ++ hash`, where
//! `hash` is the canonical hash (see `isaac_types::hash_of`) of the object's
//! signable fields. Mixing the network id into the signed message is what
//! stops a signature produced on testnet from verifying on mainnet.

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use isaac_types::{Address, Hash};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::base58;
use crate::errors::CryptoError;

fn signable_message(network_id: &[u8], hash: &Hash) -> Vec<u8> {
    let hash_bytes = hash.as_bytes();
    let mut message = Vec::with_capacity(network_id.len() + hash_bytes.len());
    message.extend_from_slice(network_id);
    message.extend_from_slice(hash_bytes);
    message
}

/// An Ed25519 public key, displayed as base-58.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    pub fn from_address(address: &Address) -> Result<Self, CryptoError> {
        Self::from_bytes(base58::decode_fixed(address)?)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The address form of this key: its base-58 encoding.
    #[must_use]
    pub fn to_address(&self) -> Address {
        base58::encode(&self.0)
    }

    /// Verifies `signature` was produced over `network_id ++ hash` by the
    /// holder of this key's secret.
    pub fn verify(
        &self,
        network_id: &[u8],
        hash: &Hash,
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key
            .verify(&signable_message(network_id, hash), &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// An Ed25519 signature, displayed as base-58.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    #[must_use]
    pub fn to_base58(&self) -> String {
        base58::encode(&self.0)
    }

    pub fn from_base58(encoded: &str) -> Result<Self, CryptoError> {
        Ok(Self(base58::decode_fixed(encoded)?))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Signature::from_base58(&encoded).map_err(D::Error::custom)
    }
}

/// A signing keypair. Secret material is zeroized on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Signs `hash` for `network_id`. Deterministic: signing the same hash
    /// under the same network id and key always produces the same signature.
    #[must_use]
    pub fn sign(&self, network_id: &[u8], hash: &Hash) -> Signature {
        let sig = self.signing_key.sign(&signable_message(network_id, hash));
        Signature(sig.to_bytes())
    }

    #[must_use]
    pub fn to_seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK_A: &[u8] = b"isaac-testnet";
    const NETWORK_B: &[u8] = b"isaac-other";

    fn sample_hash(tag: u8) -> Hash {
        let mut hash = [0u8; 32];
        hash[0] = tag;
        Hash::from_bytes(hash)
    }

    #[test]
    fn sign_and_verify_round_trips() {
        let keypair = KeyPair::generate();
        let hash = sample_hash(1);
        let signature = keypair.sign(NETWORK_A, &hash);
        assert!(keypair.public_key().verify(NETWORK_A, &hash, &signature).is_ok());
    }

    #[test]
    fn signature_does_not_verify_under_a_different_network_id() {
        let keypair = KeyPair::generate();
        let hash = sample_hash(1);
        let signature = keypair.sign(NETWORK_A, &hash);
        assert!(keypair
            .public_key()
            .verify(NETWORK_B, &hash, &signature)
            .is_err());
    }

    #[test]
    fn signature_does_not_verify_under_a_different_hash() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(NETWORK_A, &sample_hash(1));
        assert!(keypair
            .public_key()
            .verify(NETWORK_A, &sample_hash(2), &signature)
            .is_err());
    }

    #[test]
    fn signature_does_not_verify_under_a_different_key() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let hash = sample_hash(1);
        let signature = a.sign(NETWORK_A, &hash);
        assert!(b.public_key().verify(NETWORK_A, &hash, &signature).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let keypair = KeyPair::from_seed([0xABu8; 32]);
        let hash = sample_hash(9);
        assert_eq!(
            keypair.sign(NETWORK_A, &hash).as_bytes(),
            keypair.sign(NETWORK_A, &hash).as_bytes(),
        );
    }

    #[test]
    fn address_round_trips_through_base58() {
        let keypair = KeyPair::generate();
        let address = keypair.address();
        let recovered = PublicKey::from_address(&address).unwrap();
        assert_eq!(keypair.public_key(), recovered);
    }

    #[test]
    fn seed_round_trip_reproduces_the_same_key() {
        let original = KeyPair::generate();
        let restored = KeyPair::from_seed(original.to_seed());
        assert_eq!(original.public_key(), restored.public_key());
    }

    #[test]
    fn signature_serializes_as_a_base58_json_string() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(NETWORK_A, &sample_hash(1));
        let encoded = serde_json::to_string(&signature).unwrap();
        assert!(encoded.starts_with('"'));
        let decoded: Signature = serde_json::from_str(&encoded).unwrap();
        assert_eq!(signature, decoded);
    }
}
