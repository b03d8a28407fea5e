// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable offline queue stored inside a [`LocalStore`].
//!
//! Operations staged here survive restarts. The coordinator replays them
//! into the sync worker when it starts and retires each one once the worker
//! reports a terminal outcome.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::op::{OpStatus, QueuedOperation};
use crate::schema::{CollectionSchema, IndexSchema};
use crate::store::LocalStore;

/// Name of the offline queue collection.
pub const OFFLINE_QUEUE: &str = "offline_queue";

/// Index ordering staged operations by enqueue time.
pub const BY_TIMESTAMP: &str = "by_timestamp";

/// Schema for the offline queue. Include it in the store's config.
pub fn offline_queue_schema() -> CollectionSchema {
    CollectionSchema::new(OFFLINE_QUEUE)
        .index(IndexSchema::new(BY_TIMESTAMP, "timestamp"))
        .index(IndexSchema::new("by_status", "status"))
}

/// Offline queue operations over a borrowed store.
pub struct Outbox<'s> {
    store: &'s mut LocalStore,
}

impl<'s> Outbox<'s> {
    pub fn new(store: &'s mut LocalStore) -> Self {
        Outbox { store }
    }

    /// Persists an operation, stamping it with the current time if needed.
    ///
    /// Staging an id that is already queued replaces the earlier entry.
    pub fn stage(&mut self, op: &QueuedOperation) -> Result<()> {
        let mut op = op.clone();
        op.stamp(Utc::now());
        self.store.put(OFFLINE_QUEUE, serde_json::to_value(&op)?)?;
        Ok(())
    }

    /// Pending operations, oldest first.
    pub fn pending(&self) -> Result<Vec<QueuedOperation>> {
        let mut ops = self.all()?;
        ops.retain(QueuedOperation::is_pending);
        Ok(ops)
    }

    /// Every staged operation regardless of status, oldest first.
    pub fn all(&self) -> Result<Vec<QueuedOperation>> {
        self.store
            .get_all_by_index(OFFLINE_QUEUE, BY_TIMESTAMP, None)?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .collect()
    }

    /// Looks up one staged operation.
    pub fn get(&self, id: &str) -> Result<Option<QueuedOperation>> {
        self.store
            .get(OFFLINE_QUEUE, &Key::from(id))?
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .transpose()
    }

    /// Updates the status of a staged operation. Returns false if absent.
    pub fn mark(&mut self, id: &str, status: OpStatus) -> Result<bool> {
        let Some(mut op) = self.get(id)? else {
            return Ok(false);
        };
        op.status = status;
        self.store.put(OFFLINE_QUEUE, serde_json::to_value(&op)?)?;
        Ok(true)
    }

    /// Records how many delivery attempts a staged operation has used up.
    /// Returns false if absent.
    pub fn record_retry(&mut self, id: &str, retry_count: u32) -> Result<bool> {
        let Some(mut op) = self.get(id)? else {
            return Ok(false);
        };
        op.retry_count = retry_count;
        self.store.put(OFFLINE_QUEUE, serde_json::to_value(&op)?)?;
        Ok(true)
    }

    /// Removes a staged operation. Returns false if absent.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.store.delete(OFFLINE_QUEUE, &Key::from(id))
    }

    /// Removes every staged operation.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear(OFFLINE_QUEUE)
    }

    /// Number of staged operations.
    pub fn len(&self) -> Result<u64> {
        self.store.count(OFFLINE_QUEUE)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
