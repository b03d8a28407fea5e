// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing front of the sync worker.
//!
//! The coordinator starts the worker, forwards operations to it and turns
//! the worker's event stream into one [`SyncReport`] per pass. With an
//! outbox attached, every operation is also kept in the local store until
//! the worker reports a terminal outcome for it, so nothing is lost across
//! restarts or while sync is unavailable.

use std::time::Duration;

use chrono::Utc;
use rollcall_core::{LocalStore, OpStatus, Outbox, QueuedOperation, WorkerCommand, WorkerEvent};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::engine::{SyncEngine, DEFAULT_MAX_ATTEMPTS};
use super::transport::Transport;
use super::worker::WorkerHandle;
use crate::error::{Error, Result};

/// Settings for a [`SyncCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Delivery attempts per operation.
    pub max_attempts: u32,
    /// How long [`SyncCoordinator::sync`] waits for the pass to finish.
    pub reply_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            reply_timeout: Duration::from_secs(30),
        }
    }
}

/// Where an enqueued operation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Handed to the running worker.
    Sent,
    /// No worker; kept in the outbox for later.
    Staged,
    /// No worker and no outbox; the operation was discarded.
    Dropped,
}

/// Result of one sync pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// `SyncSuccess` and `SyncFailed` events in the order they arrived.
    pub outcomes: Vec<WorkerEvent>,
    /// Items still pending in the worker after the pass.
    pub remaining: usize,
    /// Items that failed terminally during the pass.
    pub failed: usize,
}

impl SyncReport {
    /// Number of items delivered during the pass.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|e| matches!(e, WorkerEvent::SyncSuccess { .. }))
            .count()
    }
}

/// Owns the worker and, optionally, the durable outbox.
pub struct SyncCoordinator {
    config: CoordinatorConfig,
    worker: Option<WorkerHandle>,
    store: Option<LocalStore>,
    /// Number of the last `SYNC` sent.
    pass: u64,
}

impl SyncCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        SyncCoordinator {
            config,
            worker: None,
            store: None,
            pass: 0,
        }
    }

    /// Attach a store holding the offline queue collection.
    pub fn with_outbox(mut self, store: LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether a worker is running.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Starts the worker and replays pending outbox entries into it.
    ///
    /// Returns `Ok(false)` when the worker thread cannot be created; the
    /// coordinator then stays usable in sync-unavailable mode.
    pub fn initialize<T: Transport + 'static>(&mut self, transport: T) -> Result<bool> {
        if self.worker.is_some() {
            return Ok(true);
        }

        let engine = SyncEngine::new(self.config.max_attempts);
        let worker = match WorkerHandle::spawn(engine, Box::new(transport)) {
            Ok(worker) => worker,
            Err(e) => {
                warn!("sync unavailable: could not start worker: {}", e);
                return Ok(false);
            }
        };

        if let Some(store) = self.store.as_mut() {
            let pending = Outbox::new(store).pending()?;
            if !pending.is_empty() {
                info!(count = pending.len(), "replaying staged operations");
            }
            for op in pending {
                worker.send(WorkerCommand::AddTask(op));
            }
        }

        self.worker = Some(worker);
        Ok(true)
    }

    /// Hands an operation to the worker, staging it in the outbox first when
    /// one is attached.
    pub fn enqueue(&mut self, mut op: QueuedOperation) -> Result<Enqueued> {
        op.stamp(Utc::now());

        let staged = match self.store.as_mut() {
            Some(store) => {
                Outbox::new(store).stage(&op)?;
                true
            }
            None => false,
        };

        let Some(worker) = self.worker.as_ref() else {
            if staged {
                debug!(id = %op.id, "sync unavailable, operation staged");
                return Ok(Enqueued::Staged);
            }
            warn!(id = %op.id, "sync unavailable, operation dropped");
            return Ok(Enqueued::Dropped);
        };

        let id = op.id.clone();
        if !worker.send(WorkerCommand::AddTask(op)) {
            warn!(id = %id, "sync worker is gone");
            return if staged {
                Ok(Enqueued::Staged)
            } else {
                Err(Error::WorkerGone)
            };
        }
        Ok(Enqueued::Sent)
    }

    /// Runs one pass and waits for it to finish.
    ///
    /// Without a worker this resolves immediately with an empty report.
    /// Events from an earlier pass that timed out are applied to the outbox
    /// but never counted in this pass's report.
    pub async fn sync(&mut self) -> Result<SyncReport> {
        let Some(worker) = self.worker.as_mut() else {
            debug!("sync unavailable, nothing to do");
            return Ok(SyncReport::default());
        };

        // Leftovers from a pass that timed out earlier.
        while let Some(event) = worker.try_recv() {
            retire(self.store.as_mut(), &event)?;
        }

        self.pass += 1;
        let current = self.pass;
        if !worker.send(WorkerCommand::Sync { pass: current }) {
            return Err(Error::WorkerGone);
        }

        let timeout_ms = u64::try_from(self.config.reply_timeout.as_millis()).unwrap_or(u64::MAX);
        let deadline = Instant::now() + self.config.reply_timeout;
        let mut report = SyncReport::default();
        loop {
            let event = match tokio::time::timeout_at(deadline, worker.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => return Err(Error::WorkerGone),
                Err(_) => return Err(Error::Timeout { timeout_ms }),
            };
            retire(self.store.as_mut(), &event)?;
            match event {
                WorkerEvent::SyncComplete {
                    pass,
                    remaining,
                    failed,
                } => {
                    if pass != current {
                        // The worker runs passes in order, so everything
                        // collected so far belonged to that stale pass.
                        debug!(stale = pass, current, "skipping completion of earlier pass");
                        report.outcomes.clear();
                        continue;
                    }
                    report.remaining = remaining;
                    report.failed = failed;
                    return Ok(report);
                }
                WorkerEvent::SyncRetry { .. } => {}
                outcome => report.outcomes.push(outcome),
            }
        }
    }

    /// Discards every operation queued in the worker and the outbox.
    pub fn clear(&mut self) -> Result<()> {
        if let Some(store) = self.store.as_mut() {
            Outbox::new(store).clear()?;
        }
        match self.worker.as_ref() {
            Some(worker) if !worker.send(WorkerCommand::ClearTasks) => Err(Error::WorkerGone),
            _ => Ok(()),
        }
    }

    /// Stops the worker and applies any events it left behind to the
    /// outbox. Safe to call more than once.
    pub fn terminate(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
            while let Some(event) = worker.try_recv() {
                if let Err(e) = retire(self.store.as_mut(), &event) {
                    warn!("could not record sync outcome: {}", e);
                }
            }
            debug!("sync worker terminated");
        }
    }

    /// Gives back the attached store, stopping the worker first.
    pub fn into_store(mut self) -> Option<LocalStore> {
        self.terminate();
        self.store.take()
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Applies a worker event to the outbox.
fn retire(store: Option<&mut LocalStore>, event: &WorkerEvent) -> Result<()> {
    let Some(store) = store else {
        return Ok(());
    };
    let mut outbox = Outbox::new(store);
    match event {
        WorkerEvent::SyncSuccess { id, .. } => {
            outbox.remove(id)?;
        }
        WorkerEvent::SyncFailed { id, .. } => {
            outbox.mark(id, OpStatus::Failed)?;
        }
        WorkerEvent::SyncRetry { id, retry_count } => {
            outbox.record_retry(id, *retry_count)?;
        }
        WorkerEvent::SyncComplete { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
