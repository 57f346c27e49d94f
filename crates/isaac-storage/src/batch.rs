//! Atomic write batches with a typed instance overlay.
//!
//! A `Batch` accumulates two things as a unit of work is built up: a set of
//! raw key/value writes to apply in order, and a typed overlay of "instances"
//! — values a caller is incrementally mutating before they're serialized into
//! the write set. Looking an instance up through `get`/`set` sees the
//! in-progress batch's edits even though nothing has touched the store yet;
//! `write` flushes the accumulated operations to the store as one atomic
//! call.

use std::any::Any;
use std::collections::HashMap;

use crate::errors::StorageError;
use crate::kv::{BatchOperation, KeyValueStore};

/// An in-flight unit of work against a [`KeyValueStore`].
#[derive(Default)]
pub struct Batch {
    instances: HashMap<String, Box<dyn Any + Send>>,
    operations: Vec<BatchOperation>,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a typed instance previously placed under `key` by [`Self::set`].
    ///
    /// Returns `Err` only if something was set under `key` with a different
    /// type than `T`; returns `Ok(None)` if nothing was set yet.
    pub fn get<T: 'static>(&self, key: &str) -> Result<Option<&T>, StorageError> {
        match self.instances.get(key) {
            None => Ok(None),
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| StorageError::InstanceTypeMismatch(key.to_string())),
        }
    }

    /// Places a typed instance under `key`, overwriting any prior value.
    pub fn set<T: 'static + Send>(&mut self, key: impl Into<String>, value: T) {
        self.instances.insert(key.into(), Box::new(value));
    }

    /// Queues a raw write, applied in call order when the batch commits.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.operations.push(BatchOperation::put(key, value));
    }

    /// Queues a raw delete, applied in call order when the batch commits.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.operations.push(BatchOperation::delete(key));
    }

    #[must_use]
    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    /// Applies every queued write to `store` atomically, consuming the batch.
    pub fn write<S: KeyValueStore + ?Sized>(self, store: &mut S) -> Result<(), StorageError> {
        store.atomic_batch_write(self.operations)
    }
}
