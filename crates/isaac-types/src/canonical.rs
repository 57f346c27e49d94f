//! Canonical hashing.
//!
//! A value's hash is the SHA-256 digest of its canonical JSON encoding:
//! object keys sorted, no whitespace, integers as integers (never floats),
//! and empty containers written as `[]`/`{}`. This is the exclusive input to
//! every signature in the system, so any two implementations that serialize
//! the same logical value must produce byte-identical output.
//!
//! `serde_json::Value`'s map type is a `BTreeMap` as long as the
//! `preserve_order` feature is not enabled (it isn't, here), so objects built
//! through `Value` sort their keys. A serde-derived struct does not go
//! through `Value` on its own, though — `to_vec`/`to_string` walk the
//! `Serialize` impl directly and emit fields in declaration order — so
//! [`canonical_bytes`] routes every value through [`serde_json::to_value`]
//! first to force that sort before encoding to bytes.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A 32-byte canonical hash. Serializes as a base-58 string, matching how
/// hashes appear inside every other signed field (addresses, signatures) so
/// a struct containing a `Hash` never mixes byte-array and string encodings.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        HashValue(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({self})")
    }
}

impl Serialize for HashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = bs58::decode(&encoded)
            .into_vec()
            .map_err(|e| D::Error::custom(format!("invalid base-58 hash: {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("hash must be 32 bytes, got {}", v.len())))?;
        Ok(HashValue(array))
    }
}

/// Alias kept for call sites that only care about the raw digest shape.
pub type Hash = HashValue;

/// Encodes `value` the same way signatures and storage keys do.
///
/// Goes through [`serde_json::Value`] rather than serializing `value`
/// straight to bytes: a derived `Serialize` impl writes fields in
/// declaration order, and only `Value`'s `BTreeMap`-backed object actually
/// sorts keys.
pub fn canonical_bytes<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let sorted = serde_json::to_value(value)?;
    serde_json::to_vec(&sorted)
}

/// Hashes `value`'s canonical encoding.
pub fn hash_of<T: Serialize>(value: &T) -> Hash {
    let bytes = canonical_bytes(value).expect("canonical types are always serializable");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    HashValue(hasher.finalize().into())
}
