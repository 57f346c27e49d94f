//! Events published after a batch write commits.

use isaac_ledger::{Account, Block};
use isaac_types::Address;

/// Events the block engine publishes once a round's batch write lands.
///
/// Matches the "BlockAccountObserver" callback: one `BlockCommitted` per
/// round, followed by one `AccountUpdated` per account the round touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A block was written to storage.
    BlockCommitted {
        /// The committed block.
        block: Block,
    },
    /// An account was written to storage as part of the same round.
    AccountUpdated {
        /// The account's address.
        address: Address,
        /// The account's state after the write.
        account: Account,
    },
}

impl LedgerEvent {
    /// The topic this event belongs to, for subscription filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockCommitted { .. } => EventTopic::Block,
            Self::AccountUpdated { .. } => EventTopic::Account,
        }
    }
}

/// Topics an observer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    /// Block-commit events only.
    Block,
    /// Account-update events only.
    Account,
    /// Every event, unfiltered.
    All,
}

/// Filter applied to a subscription. An empty `topics` list matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// A filter that accepts every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter that accepts only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether `event` matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isaac_types::{Amount, Timestamp};

    fn sample_block() -> Block {
        let zero = isaac_types::Hash::from_bytes([0u8; 32]);
        Block::new(1, zero, 0, "proposer".to_string(), zero, vec![], Timestamp::from_nanos(0))
    }

    #[test]
    fn filter_all_matches_everything() {
        let filter = EventFilter::all();
        let event = LedgerEvent::BlockCommitted { block: sample_block() };
        assert!(filter.matches(&event));
    }

    #[test]
    fn filter_by_topic_excludes_other_topics() {
        let filter = EventFilter::topics(vec![EventTopic::Block]);
        let account_event = LedgerEvent::AccountUpdated {
            address: "a".to_string(),
            account: Account::new("a".to_string(), Amount::new(1), None, Timestamp::from_nanos(0)),
        };
        assert!(!filter.matches(&account_event));

        let block_event = LedgerEvent::BlockCommitted { block: sample_block() };
        assert!(filter.matches(&block_event));
    }
}
