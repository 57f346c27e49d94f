//! # isaac-types
//!
//! Primitive types shared by every crate in the workspace: a fixed-precision
//! `Amount`, `Address`, ISO-8601 `Timestamp`, and the canonical hashing used
//! identically by signatures and by storage key derivation.
//!
//! Every other crate in the workspace depends on this one; this one depends
//! on nothing internal.

pub mod amount;
pub mod canonical;
pub mod errors;
pub mod time;

pub use amount::Amount;
pub use canonical::{hash_of, Hash};
pub use errors::TypesError;
pub use time::Timestamp;

/// A validator/account address: the base-58 encoding of an Ed25519 public key.
pub type Address = String;
