//! The default [`PeerTransport`] this binary wires in.
//!
//! Wire framing (sockets, HTTP/2) is explicitly out of scope for the core —
//! `isaac_network::broadcast::PeerTransport` is the seam a real deployment
//! plugs a transport into. `NullTransport` is what a single, unconnected
//! validator needs: with an empty roster `Broadcaster::broadcast` never
//! calls `send` at all, so this only matters once peers are configured, at
//! which point a real implementation of this trait replaces it.

use async_trait::async_trait;
use isaac_network::PeerTransport;

pub struct NullTransport;

#[async_trait]
impl PeerTransport for NullTransport {
    async fn send(&self, endpoint: &str, _message: Vec<u8>) -> Result<(), String> {
        Err(format!("no transport configured to reach {endpoint}"))
    }
}
