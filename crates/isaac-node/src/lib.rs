//! # isaac-node
//!
//! The node binary's internals: configuration loading, genesis bootstrap,
//! and the round-driving loop that turns `isaac_consensus`'s state machine,
//! `isaac_txpool`'s pool, and `isaac_blockengine`'s finish-ballot engine
//! into a running validator.

pub mod container;
pub mod errors;
pub mod node;
pub mod transport;

pub use container::config::{ConfigError, NodeConfig, WatcherMode};
pub use errors::NodeError;
pub use node::Node;
pub use transport::NullTransport;
