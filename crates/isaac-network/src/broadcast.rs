//! Non-blocking broadcast: fan out a message to every connected validator
//! concurrently, with each peer's send failure independent of the others'.
//!
//! The wire transport is injected as a [`PeerTransport`] — this crate knows
//! nothing about sockets or HTTP/2 framing, only that sending to one peer
//! must not be allowed to block sending to the rest.

use std::sync::Arc;

use async_trait::async_trait;
use isaac_types::Address;
use tracing::warn;

use crate::errors::NetworkError;
use crate::roster::ValidatorRoster;

/// The capability a broadcaster needs from the transport layer: fire a
/// message at one endpoint. Implementations own retries, framing, and
/// connection pooling; this crate only calls it.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, endpoint: &str, message: Vec<u8>) -> Result<(), String>;
}

/// Fans a message out to every currently-connected validator. Each peer is
/// sent to on its own task, so one slow or failing peer never delays the
/// others — per `spec.md`'s "Broadcast(msg) fans out concurrently... per-peer
/// failures are independent."
pub struct Broadcaster<T: PeerTransport + 'static> {
    transport: Arc<T>,
}

/// The outcome of one broadcast: which peers were sent to and which failed.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub sent: Vec<Address>,
    pub failed: Vec<(Address, String)>,
}

impl<T: PeerTransport + 'static> Broadcaster<T> {
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Broadcaster { transport }
    }

    /// Sends `message` to every validator the roster currently considers
    /// live, concurrently. Never returns an error itself — per-peer failures
    /// are collected in the report rather than aborting the whole fan-out.
    pub async fn broadcast(&self, roster: &ValidatorRoster, message: Vec<u8>) -> BroadcastReport {
        let targets: Vec<(Address, String)> = roster
            .connected()
            .into_iter()
            .filter_map(|addr| roster.endpoint(&addr).map(|endpoint| (addr, endpoint)))
            .collect();

        let mut tasks = Vec::with_capacity(targets.len());
        for (address, endpoint) in targets {
            let transport = Arc::clone(&self.transport);
            let payload = message.clone();
            tasks.push(tokio::spawn(async move {
                let result = transport.send(&endpoint, payload).await;
                (address, endpoint, result)
            }));
        }

        let mut report = BroadcastReport::default();
        for task in tasks {
            match task.await {
                Ok((address, _endpoint, Ok(()))) => report.sent.push(address),
                Ok((address, endpoint, Err(reason))) => {
                    warn!(%address, %endpoint, %reason, "broadcast send failed");
                    report.failed.push((address, reason));
                }
                Err(join_error) => {
                    warn!(%join_error, "broadcast task panicked");
                }
            }
        }
        report
    }
}

/// Blocks (polling on an interval) until at least `required` validators in
/// `roster` are connected, or `timeout` elapses.
pub async fn wait_for_threshold(
    roster: &ValidatorRoster,
    required: usize,
    timeout: std::time::Duration,
) -> Result<(), NetworkError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if roster.connected_count() >= required {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(NetworkError::StartTimedOut {
                connected: roster.connected_count(),
                required,
            });
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
        fail_for: &'static str,
    }

    #[async_trait]
    impl PeerTransport for CountingTransport {
        async fn send(&self, endpoint: &str, _message: Vec<u8>) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if endpoint == self.fail_for {
                Err("connection refused".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connected_validator() {
        let roster = ValidatorRoster::new();
        roster.upsert("a".to_string(), "host-a".to_string());
        roster.upsert("b".to_string(), "host-b".to_string());
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            fail_for: "nowhere",
        });
        let broadcaster = Broadcaster::new(Arc::clone(&transport));
        let report = broadcaster.broadcast(&roster, b"ballot".to_vec()).await;
        assert_eq!(report.sent.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_failing_peer_does_not_prevent_others_from_being_sent_to() {
        let roster = ValidatorRoster::new();
        roster.upsert("a".to_string(), "host-a".to_string());
        roster.upsert("b".to_string(), "host-b".to_string());
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            fail_for: "host-a",
        });
        let broadcaster = Broadcaster::new(transport);
        let report = broadcaster.broadcast(&roster, b"ballot".to_vec()).await;
        assert_eq!(report.sent, vec!["b".to_string()]);
        assert_eq!(report.failed.len(), 1);
    }

    #[tokio::test]
    async fn wait_for_threshold_times_out_when_unreachable() {
        let roster = ValidatorRoster::new();
        roster.upsert("a".to_string(), "host-a".to_string());
        let result = wait_for_threshold(&roster, 5, std::time::Duration::from_millis(80)).await;
        assert!(matches!(result, Err(NetworkError::StartTimedOut { .. })));
    }

    #[tokio::test]
    async fn wait_for_threshold_succeeds_once_enough_are_connected() {
        let roster = ValidatorRoster::new();
        roster.upsert("a".to_string(), "host-a".to_string());
        roster.upsert("b".to_string(), "host-b".to_string());
        let result = wait_for_threshold(&roster, 2, std::time::Duration::from_millis(200)).await;
        assert!(result.is_ok());
    }
}
