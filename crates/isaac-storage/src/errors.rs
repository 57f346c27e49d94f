//! Storage error types.

use thiserror::Error;

/// Errors raised by a [`crate::KeyValueStore`] or a [`crate::Batch`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store's `get`/`put`/`delete`/`scan` call itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored value didn't decode back into the type its key implies —
    /// the bytes under the key are not what a well-behaved writer put there.
    #[error("stored value is corrupt: {0}")]
    Corruption(String),

    /// The backing store's underlying transport or filesystem failed. The
    /// in-memory backend never produces this; a disk- or network-backed one
    /// would.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// [`crate::KeyValueStore::new`] was asked to create a key that is
    /// already present.
    #[error("key {0:?} already exists")]
    AlreadyExists(Vec<u8>),

    /// A caller required a key to be present and it wasn't.
    #[error("key {0:?} not found")]
    NotFound(Vec<u8>),

    /// `Batch::get` was asked for a type that does not match what was
    /// `Batch::set` under that key.
    #[error("instance overlay type mismatch for key {0:?}")]
    InstanceTypeMismatch(String),
}
