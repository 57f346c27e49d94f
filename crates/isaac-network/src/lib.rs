//! # isaac-network
//!
//! The connection manager: a validator roster with liveness tracking, and a
//! non-blocking broadcast primitive built on top of it. The wire transport
//! (sockets, HTTP/2 framing) is injected via [`broadcast::PeerTransport`] —
//! this crate only owns who to send to and how to fan out concurrently.

pub mod broadcast;
pub mod errors;
pub mod manager;
pub mod roster;

pub use broadcast::{BroadcastReport, Broadcaster, PeerTransport};
pub use errors::NetworkError;
pub use manager::ConnectionManager;
pub use roster::ValidatorRoster;
