//! The pending transaction pool.
//!
//! A thread-safe hash→transaction map with FIFO retrieval. Unlike a fee
//! market mempool, eviction is not priority-based: capacity is a hard limit
//! (`TxPoolNodeLimit`) and admission is otherwise first-come, first-served,
//! matching a closed validator set where every honest transaction eventually
//! gets proposed rather than competing on a fee auction.

use std::collections::{HashMap, VecDeque};

use isaac_ledger::Transaction;
use isaac_types::{Address, Hash};
use parking_lot::RwLock;

use crate::errors::PoolError;

struct Inner {
    order: VecDeque<Hash>,
    by_hash: HashMap<Hash, Transaction>,
    by_source: HashMap<Address, usize>,
}

/// Pool capacity limits.
#[derive(Debug, Clone, Copy)]
pub struct PoolLimits {
    /// Maximum total transactions the pool holds at once.
    pub node_limit: usize,
    /// Maximum transactions a single source address may have pending.
    pub client_limit: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        PoolLimits {
            node_limit: 10_000,
            client_limit: 100,
        }
    }
}

/// An in-memory, thread-safe pool of pending transactions.
pub struct TransactionPool {
    limits: PoolLimits,
    inner: RwLock<Inner>,
}

impl TransactionPool {
    #[must_use]
    pub fn new(limits: PoolLimits) -> Self {
        TransactionPool {
            limits,
            inner: RwLock::new(Inner {
                order: VecDeque::new(),
                by_hash: HashMap::new(),
                by_source: HashMap::new(),
            }),
        }
    }

    /// Adds `tx` to the pool. A transaction already present by hash is a
    /// no-op, not an error — the pool is idempotent under re-submission.
    ///
    /// Rejects a transaction that is structurally malformed (an operation
    /// targets its own source, or carries a zero amount) before it ever
    /// reaches a proposer; this is independent of the state-dependent checks
    /// (does the source exist, is the sequence-id next) a proposer's vote
    /// and the finish-ballot engine each run later.
    pub fn add(&self, tx: Transaction) -> Result<(), PoolError> {
        tx.body
            .check_no_self_targeting()
            .map_err(|e| PoolError::Malformed(e.to_string()))?;
        for op in &tx.body.operations {
            op.check_well_formed().map_err(|e| PoolError::Malformed(e.to_string()))?;
        }

        let mut inner = self.inner.write();
        if inner.by_hash.contains_key(&tx.hash) {
            return Ok(());
        }
        if inner.by_hash.len() >= self.limits.node_limit {
            return Err(PoolError::PoolFull {
                capacity: self.limits.node_limit,
            });
        }
        let source_count = inner.by_source.get(&tx.body.source).copied().unwrap_or(0);
        if source_count >= self.limits.client_limit {
            return Err(PoolError::ClientLimitReached(tx.body.source.clone()));
        }
        *inner.by_source.entry(tx.body.source.clone()).or_insert(0) += 1;
        inner.order.push_back(tx.hash);
        inner.by_hash.insert(tx.hash, tx);
        Ok(())
    }

    #[must_use]
    pub fn has(&self, hash: &Hash) -> bool {
        self.inner.read().by_hash.contains_key(hash)
    }

    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<Transaction> {
        self.inner.read().by_hash.get(hash).cloned()
    }

    /// Removes a transaction by hash, returning it if it was present. Called
    /// once a transaction's ballot reaches `ALL-CONFIRM` and ownership passes
    /// to the block layer.
    pub fn remove(&self, hash: &Hash) -> Option<Transaction> {
        let mut inner = self.inner.write();
        let tx = inner.by_hash.remove(hash)?;
        inner.order.retain(|h| h != hash);
        if let Some(count) = inner.by_source.get_mut(&tx.body.source) {
            *count -= 1;
            if *count == 0 {
                inner.by_source.remove(&tx.body.source);
            }
        }
        Some(tx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns up to `n` pending transaction hashes in FIFO insertion order,
    /// skipping any hash whose source has already appeared earlier in the
    /// returned sequence — a proposer must never put two transactions from
    /// the same source in one ballot.
    #[must_use]
    pub fn available(&self, n: usize) -> Vec<Hash> {
        let inner = self.inner.read();
        let mut seen_sources: std::collections::HashSet<&Address> = std::collections::HashSet::new();
        let mut result = Vec::with_capacity(n.min(inner.order.len()));
        for hash in &inner.order {
            if result.len() >= n {
                break;
            }
            let Some(tx) = inner.by_hash.get(hash) else { continue };
            if seen_sources.insert(&tx.body.source) {
                result.push(*hash);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isaac_crypto::KeyPair;
    use isaac_ledger::{Operation, TransactionBody};
    use isaac_types::{Amount, Timestamp};

    fn tx(keypair: &KeyPair, sequence_id: u64) -> Transaction {
        let body = TransactionBody {
            source: keypair.address(),
            fee: Amount::new(1),
            sequence_id,
            operations: vec![Operation::Payment {
                target: "dest".to_string(),
                amount: Amount::new(10),
            }],
        };
        Transaction::new_signed(keypair, b"net", body, Timestamp::from_nanos(0))
    }

    #[test]
    fn add_then_get_round_trips() {
        let pool = TransactionPool::new(PoolLimits::default());
        let keypair = KeyPair::generate();
        let t = tx(&keypair, 0);
        pool.add(t.clone()).unwrap();
        assert!(pool.has(&t.hash));
        assert_eq!(pool.get(&t.hash).unwrap().hash, t.hash);
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let pool = TransactionPool::new(PoolLimits::default());
        let keypair = KeyPair::generate();
        let t = tx(&keypair, 0);
        pool.add(t.clone()).unwrap();
        pool.add(t).unwrap();
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_evicts_and_frees_source_slot() {
        let pool = TransactionPool::new(PoolLimits::default());
        let keypair = KeyPair::generate();
        let t = tx(&keypair, 0);
        pool.add(t.clone()).unwrap();
        assert!(pool.remove(&t.hash).is_some());
        assert!(!pool.has(&t.hash));
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn available_returns_fifo_order_up_to_n() {
        let pool = TransactionPool::new(PoolLimits::default());
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let ta = tx(&a, 0);
        let tb = tx(&b, 0);
        pool.add(ta.clone()).unwrap();
        pool.add(tb.clone()).unwrap();
        assert_eq!(pool.available(10), vec![ta.hash, tb.hash]);
        assert_eq!(pool.available(1), vec![ta.hash]);
    }

    #[test]
    fn available_excludes_a_second_transaction_from_the_same_source() {
        let pool = TransactionPool::new(PoolLimits::default());
        let keypair = KeyPair::generate();
        let first = tx(&keypair, 0);
        let second = tx(&keypair, 1);
        pool.add(first.clone()).unwrap();
        pool.add(second).unwrap();
        assert_eq!(pool.available(10), vec![first.hash]);
    }

    #[test]
    fn node_limit_rejects_once_full() {
        let pool = TransactionPool::new(PoolLimits {
            node_limit: 1,
            client_limit: 100,
        });
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        pool.add(tx(&a, 0)).unwrap();
        assert!(matches!(pool.add(tx(&b, 0)), Err(PoolError::PoolFull { .. })));
    }

    #[test]
    fn a_self_targeting_transaction_is_rejected_at_admission() {
        let pool = TransactionPool::new(PoolLimits::default());
        let keypair = KeyPair::generate();
        let body = TransactionBody {
            source: keypair.address(),
            fee: Amount::new(1),
            sequence_id: 0,
            operations: vec![Operation::Payment {
                target: keypair.address(),
                amount: Amount::new(10),
            }],
        };
        let t = Transaction::new_signed(&keypair, b"net", body, Timestamp::from_nanos(0));
        assert!(matches!(pool.add(t), Err(PoolError::Malformed(_))));
    }

    #[test]
    fn client_limit_rejects_a_single_source_past_its_cap() {
        let pool = TransactionPool::new(PoolLimits {
            node_limit: 100,
            client_limit: 1,
        });
        let keypair = KeyPair::generate();
        pool.add(tx(&keypair, 0)).unwrap();
        assert!(matches!(
            pool.add(tx(&keypair, 1)),
            Err(PoolError::ClientLimitReached(_))
        ));
    }
}
