//! # isaac-blockengine
//!
//! The deterministic finish-ballot engine: turns a confirmed ballot and a
//! transaction pool snapshot into a persisted block, plus the genesis
//! bootstrap that writes height 0 the first time a node starts.

pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod errors;

pub use bootstrap::bootstrap_genesis;
pub use config::BlockEngineConfig;
pub use engine::finish_ballot;
pub use errors::FinishBallotError;
