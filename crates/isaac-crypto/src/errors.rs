//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A byte slice was not a valid Ed25519 public key.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A byte slice was not a valid Ed25519 signature.
    #[error("invalid signature format")]
    InvalidSignatureFormat,

    /// Signature did not verify against the given message and key.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// A string was not valid base-58.
    #[error("invalid base-58 encoding: {0}")]
    InvalidBase58(String),

    /// A decoded base-58 payload had the wrong length for its type.
    #[error("wrong decoded length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
