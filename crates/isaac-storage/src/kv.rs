//! The [`KeyValueStore`] port and its in-memory adapter.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::errors::StorageError;

/// A single write in an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Write `value` at `key`, overwriting any existing value.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Remove `key` if present.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    #[must_use]
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Options controlling a prefix scan.
#[derive(Debug, Clone, Default)]
pub struct IterOptions {
    /// Iterate from the lexicographically greatest matching key down to the
    /// least, instead of ascending.
    pub reverse: bool,
    /// Resume after (exclusive of) this key, for paging through a large
    /// prefix without re-scanning what a caller already consumed.
    pub cursor: Option<Vec<u8>>,
    /// Stop after this many results.
    pub limit: Option<usize>,
}

impl IterOptions {
    #[must_use]
    pub fn forward() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<Vec<u8>>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An ordered key-value store with atomic batch writes and prefix iteration.
///
/// Keys are compared byte-for-byte in lexicographic order; callers that need
/// keys to sort the same as a numeric field (e.g. block height) encode that
/// field big-endian and fixed-width so lexicographic order matches numeric
/// order.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), StorageError>;

    fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    /// Reads `key`, failing with [`StorageError::NotFound`] instead of
    /// returning `None`, for callers that already know the key must exist.
    fn require(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        self.get(key)?.ok_or_else(|| StorageError::NotFound(key.to_vec()))
    }

    /// Writes `key` iff it is not already present, failing with
    /// [`StorageError::AlreadyExists`] otherwise and leaving the existing
    /// value untouched.
    fn new(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        if self.exists(key)? {
            return Err(StorageError::AlreadyExists(key.to_vec()));
        }
        self.put(key, value)
    }

    /// Applies every operation or none of them.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StorageError>;

    /// Lists `(key, value)` pairs whose key starts with `prefix`, ordered and
    /// bounded according to `options`.
    fn iter_prefix(
        &self,
        prefix: &[u8],
        options: IterOptions,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;
}

/// A `BTreeMap`-backed store. Ordering makes it a faithful stand-in for the
/// node's production store in tests: prefix scans return the same order an
/// on-disk ordered engine would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    for i in (0..upper.len()).rev() {
        if upper[i] != 0xff {
            upper[i] += 1;
            upper.truncate(i + 1);
            return Some(upper);
        }
    }
    None
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StorageError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn iter_prefix(
        &self,
        prefix: &[u8],
        options: IterOptions,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let lower = match (&options.cursor, options.reverse) {
            (Some(cursor), false) => Bound::Excluded(cursor.clone()),
            _ => Bound::Included(prefix.to_vec()),
        };
        let upper = match (&options.cursor, options.reverse) {
            (Some(cursor), true) => Bound::Excluded(cursor.clone()),
            _ => match prefix_upper_bound(prefix) {
                Some(bound) => Bound::Excluded(bound),
                None => Bound::Unbounded,
            },
        };

        let range = self.data.range((lower, upper));
        let matching = range.filter(|(k, _)| k.starts_with(prefix));

        let mut results: Vec<_> = if options.reverse {
            matching.rev().map(|(k, v)| (k.clone(), v.clone())).collect()
        } else {
            matching.map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        if let Some(limit) = options.limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for i in 0..5u8 {
            store.put(&[b'k', i], &[i]).unwrap();
        }
        store
    }

    #[test]
    fn get_put_delete_round_trip() {
        let mut store = InMemoryStore::new();
        store.put(b"a", b"1").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        store.delete(b"a").unwrap();
        assert_eq!(store.get(b"a").unwrap(), None);
    }

    #[test]
    fn atomic_batch_write_applies_every_operation() {
        let mut store = InMemoryStore::new();
        store.put(b"keep", b"old").unwrap();
        let ops = vec![
            BatchOperation::put(b"a".to_vec(), b"1".to_vec()),
            BatchOperation::delete(b"keep".to_vec()),
        ];
        store.atomic_batch_write(ops).unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"keep").unwrap(), None);
    }

    #[test]
    fn prefix_scan_is_ascending_by_default() {
        let store = seeded();
        let results = store.iter_prefix(b"k", IterOptions::forward()).unwrap();
        let keys: Vec<_> = results.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec![b'k', 0], vec![b'k', 1], vec![b'k', 2], vec![b'k', 3], vec![b'k', 4]]);
    }

    #[test]
    fn prefix_scan_reverse_is_descending() {
        let store = seeded();
        let results = store.iter_prefix(b"k", IterOptions::reverse()).unwrap();
        let keys: Vec<_> = results.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec![b'k', 4], vec![b'k', 3], vec![b'k', 2], vec![b'k', 1], vec![b'k', 0]]);
    }

    #[test]
    fn prefix_scan_respects_limit() {
        let store = seeded();
        let results = store
            .iter_prefix(b"k", IterOptions::forward().with_limit(2))
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn prefix_scan_cursor_resumes_forward() {
        let store = seeded();
        let first = store
            .iter_prefix(b"k", IterOptions::forward().with_limit(2))
            .unwrap();
        let last_key = first.last().unwrap().0.clone();
        let next = store
            .iter_prefix(b"k", IterOptions::forward().with_cursor(last_key))
            .unwrap();
        let keys: Vec<_> = next.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec![b'k', 2], vec![b'k', 3], vec![b'k', 4]]);
    }

    #[test]
    fn prefix_scan_cursor_resumes_reverse() {
        let store = seeded();
        let first = store
            .iter_prefix(b"k", IterOptions::reverse().with_limit(2))
            .unwrap();
        let last_key = first.last().unwrap().0.clone();
        let next = store
            .iter_prefix(b"k", IterOptions::reverse().with_cursor(last_key))
            .unwrap();
        let keys: Vec<_> = next.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec![b'k', 2], vec![b'k', 1], vec![b'k', 0]]);
    }

    #[test]
    fn new_creates_a_key_once_and_rejects_the_second_attempt() {
        let mut store = InMemoryStore::new();
        store.new(b"a", b"1").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(matches!(store.new(b"a", b"2"), Err(StorageError::AlreadyExists(_))));
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn require_fails_with_not_found_for_a_missing_key() {
        let store = InMemoryStore::new();
        assert!(matches!(store.require(b"missing"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn prefix_scan_excludes_non_matching_keys() {
        let mut store = InMemoryStore::new();
        store.put(b"aa", b"1").unwrap();
        store.put(b"ab", b"2").unwrap();
        store.put(b"b", b"3").unwrap();
        let results = store.iter_prefix(b"a", IterOptions::forward()).unwrap();
        assert_eq!(results.len(), 2);
    }
}
