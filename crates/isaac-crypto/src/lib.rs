//! # isaac-crypto
//!
//! Ed25519 signing/verification over `network_id ++ hash`, and the base-58
//! encoding used for addresses, public keys, and signatures on the wire and
//! in storage keys.

#![warn(missing_docs)]

pub mod base58;
pub mod errors;
pub mod keys;

pub use errors::CryptoError;
pub use keys::{KeyPair, PublicKey, Signature};
