//! # isaac-eventbus
//!
//! Optional post-commit observer subscription: the block engine publishes a
//! `LedgerEvent` after each round's batch write lands, and anything
//! listening (audit logging, a read-model projector) subscribes without the
//! block engine knowing it exists. Nothing in the consensus or storage path
//! depends on this crate; a node that never constructs a bus pays nothing.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventTopic, EventFilter, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events buffered per subscriber before a lagging one starts missing events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_exposed() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
