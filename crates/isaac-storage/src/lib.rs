//! # isaac-storage
//!
//! A generic ordered key-value engine: the [`KeyValueStore`] port, an
//! in-memory adapter used throughout the workspace's tests, and [`Batch`],
//! the atomic write-unit every higher-level write path builds on.
//!
//! This crate knows nothing about blocks, accounts, or transactions — that
//! domain model lives in `isaac_ledger`, which is built entirely on the port
//! defined here.

pub mod batch;
pub mod errors;
pub mod kv;

pub use batch::Batch;
pub use errors::StorageError;
pub use kv::{BatchOperation, InMemoryStore, IterOptions, KeyValueStore};
