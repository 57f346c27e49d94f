//! Base-58 encoding for addresses, public keys, and signatures.
//!
//! The reference node encodes all three the same way it encodes Bitcoin-style
//! keys: plain base-58, no checksum, no version byte. We follow that exactly
//! so addresses round-trip byte-for-byte with the reference implementation's
//! encoding.

use crate::errors::CryptoError;

/// Encodes raw bytes as base-58.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decodes a base-58 string into exactly `expected_len` bytes.
pub fn decode_fixed<const N: usize>(encoded: &str) -> Result<[u8; N], CryptoError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::InvalidBase58(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::WrongLength { expected: N, actual })
}
