//! Errors shared by the primitive types in this crate.

use thiserror::Error;

/// Errors raised by arithmetic and encoding on the core primitive types.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TypesError {
    /// An `Amount` addition or subtraction overflowed/underflowed `u64`.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// An address did not decode to a well-formed base-58 public key.
    #[error("malformed address")]
    MalformedAddress,
}
