// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retrying delivery queue driven by the sync worker.
//!
//! The engine owns the in-memory queue of pending operations. Each pass
//! attempts every queued operation once and decides its fate:
//!
//! | Result                         | Action                                     |
//! |--------------------------------|--------------------------------------------|
//! | 2xx                            | removed, `SyncSuccess`                     |
//! | 5xx / 429 / network, budget left | `retry_count += 1`, `SyncRetry`          |
//! | 5xx / 429 / network, exhausted | removed, `SyncFailed` (max retries/network)|
//! | anything else                  | removed, `SyncFailed` (client error)       |

use std::collections::BTreeMap;

use chrono::Utc;
use rollcall_core::{FailureReason, OpStatus, QueuedOperation, WorkerEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::transport::{classify, Outcome, Transport};

/// Default number of delivery attempts per operation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Counts from one pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Items delivered and removed.
    pub succeeded: usize,
    /// Items that failed terminally and were removed.
    pub failed: usize,
    /// Items still queued after the pass.
    pub remaining: usize,
    /// Whether the pass stopped early on cancellation.
    pub cancelled: bool,
}

/// In-memory queue of operations awaiting delivery.
pub struct SyncEngine {
    queue: BTreeMap<String, QueuedOperation>,
    max_attempts: u32,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SyncEngine {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(max_attempts: u32) -> Self {
        SyncEngine {
            queue: BTreeMap::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Queues an operation. An id that is already queued is replaced.
    pub fn add_task(&mut self, mut op: QueuedOperation) {
        op.stamp(Utc::now());
        op.status = OpStatus::Pending;
        debug!(id = %op.id, method = %op.method, endpoint = %op.endpoint, "queued");
        self.queue.insert(op.id.clone(), op);
    }

    /// Discards every queued operation.
    pub fn clear_tasks(&mut self) {
        debug!(dropped = self.queue.len(), "queue cleared");
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&QueuedOperation> {
        self.queue.get(id)
    }

    /// Attempts every queued operation once.
    ///
    /// `emit` receives one event per attempted item, then a final
    /// `SyncComplete` carrying `pass`. Cancellation is checked before each
    /// item; items not reached are left untouched.
    pub async fn sync_pass<F>(
        &mut self,
        pass: u64,
        transport: &dyn Transport,
        cancel: &CancellationToken,
        mut emit: F,
    ) -> PassSummary
    where
        F: FnMut(WorkerEvent),
    {
        let mut summary = PassSummary::default();
        let ids: Vec<String> = self.queue.keys().cloned().collect();

        for id in ids {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let Some(op) = self.queue.get(&id) else {
                continue;
            };

            let result = transport.deliver(op).await;
            debug!(id = %id, result = ?result, "delivery attempt");

            let event = match result {
                Ok(status) => match classify(status) {
                    Outcome::Delivered => {
                        self.queue.remove(&id);
                        WorkerEvent::SyncSuccess { id, status }
                    }
                    Outcome::Transient => self.retry_or_fail(
                        id,
                        FailureReason::MaxRetriesExceeded,
                        Some(status),
                        None,
                    ),
                    Outcome::Rejected => {
                        self.queue.remove(&id);
                        WorkerEvent::SyncFailed {
                            id,
                            reason: FailureReason::ClientError,
                            status: Some(status),
                            error: None,
                        }
                    }
                },
                Err(e) if e.is_retryable() => {
                    self.retry_or_fail(id, FailureReason::NetworkError, None, Some(e.to_string()))
                }
                Err(e) => {
                    self.queue.remove(&id);
                    WorkerEvent::SyncFailed {
                        id,
                        reason: FailureReason::NetworkError,
                        status: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            match &event {
                WorkerEvent::SyncSuccess { .. } => summary.succeeded += 1,
                WorkerEvent::SyncFailed { id, reason, .. } => {
                    warn!(id = %id, reason = %reason, "operation dropped");
                    summary.failed += 1;
                }
                WorkerEvent::SyncRetry { .. } | WorkerEvent::SyncComplete { .. } => {}
            }
            emit(event);
        }

        summary.remaining = self.queue.len();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            remaining = summary.remaining,
            cancelled = summary.cancelled,
            "sync pass finished"
        );
        emit(WorkerEvent::SyncComplete {
            pass,
            remaining: summary.remaining,
            failed: summary.failed,
        });
        summary
    }

    /// Counts a transient failure against the item's budget.
    ///
    /// Returns `SyncRetry` while the item stays queued and the terminal
    /// `SyncFailed` once the budget is spent.
    fn retry_or_fail(
        &mut self,
        id: String,
        reason: FailureReason,
        status: Option<u16>,
        error: Option<String>,
    ) -> WorkerEvent {
        let max_attempts = self.max_attempts;
        if let Some(op) = self.queue.get_mut(&id) {
            if op.retry_count + 1 < max_attempts {
                op.retry_count += 1;
                debug!(id = %id, retry_count = op.retry_count, "will retry");
                let retry_count = op.retry_count;
                return WorkerEvent::SyncRetry { id, retry_count };
            }
        }
        self.queue.remove(&id);
        WorkerEvent::SyncFailed {
            id,
            reason,
            status,
            error,
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
