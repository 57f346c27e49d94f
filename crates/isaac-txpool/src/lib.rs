//! # isaac-txpool
//!
//! The pending transaction pool: a thread-safe hash→transaction map with
//! FIFO retrieval, source-uniqueness filtering for ballot proposals, and
//! node/client capacity limits.

pub mod errors;
pub mod pool;

pub use errors::PoolError;
pub use pool::{PoolLimits, TransactionPool};
