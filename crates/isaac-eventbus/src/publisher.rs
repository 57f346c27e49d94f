//! Publishing side of the event bus.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Publishes ledger events to subscribed observers.
///
/// The block engine calls this after a round's batch write commits; there
/// is no guarantee an observer sees an event before the write it describes
/// is durable, since publication happens strictly after `Batch::write`
/// returns `Ok`.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns how many subscribers received it.
    async fn publish(&self, event: LedgerEvent) -> usize;

    /// Total events published over this bus's lifetime.
    fn events_published(&self) -> u64;
}

/// In-process, single-node event bus built on `tokio::sync::broadcast`.
///
/// A lagging subscriber silently misses events older than its channel
/// capacity rather than blocking the publisher; this is a post-commit
/// notification mechanism, not a replication log.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// A new bus with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A new bus with an explicit channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "new observer subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// A `Stream` view of a subscription matching `filter`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of currently active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The channel capacity this bus was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = ?topic, receivers, "event published");
                receivers
            }
            Err(_) => {
                warn!(topic = ?topic, "event dropped, no observers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
