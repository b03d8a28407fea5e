// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged between the coordinator and the sync worker.
//!
//! The protocol is small:
//! - The coordinator sends commands (`ADD_TASK`, `SYNC`, `CLEAR_TASKS`)
//! - The worker reports per-item outcomes and pass completion
//!
//! Every `SYNC` carries a pass number that the matching `SYNC_COMPLETE`
//! echoes, so a caller can tell its own pass from one it stopped waiting for.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::op::QueuedOperation;

/// Messages sent into the sync worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerCommand {
    /// Enqueue one operation.
    AddTask(QueuedOperation),

    /// Run one pass over the queue.
    Sync {
        #[serde(default)]
        pass: u64,
    },

    /// Discard the whole queue.
    ClearTasks,
}

/// Why an operation was dropped without being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The server rejected the request with a non-retryable status.
    ClientError,
    /// Transient server failures exhausted the retry budget.
    MaxRetriesExceeded,
    /// No response could be obtained within the retry budget.
    NetworkError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ClientError => "client_error",
            FailureReason::MaxRetriesExceeded => "max_retries_exceeded",
            FailureReason::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Messages sent back from the sync worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerEvent {
    /// An operation was delivered and removed from the queue.
    SyncSuccess {
        id: String,
        /// HTTP status returned by the server.
        status: u16,
    },

    /// An operation failed terminally and was removed from the queue.
    SyncFailed {
        id: String,
        reason: FailureReason,
        /// Last HTTP status, when a response was received.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Transport error detail, when no response was received.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// A transient failure was counted; the operation stays queued.
    SyncRetry {
        id: String,
        /// Failed attempts so far.
        retry_count: u32,
    },

    /// A pass finished.
    SyncComplete {
        /// Number of the `SYNC` command this pass answered.
        #[serde(default)]
        pass: u64,
        /// Items still pending after the pass.
        remaining: usize,
        /// Items that failed terminally during the pass.
        failed: usize,
    },
}

impl WorkerEvent {
    /// The operation this event is about, if any.
    pub fn op_id(&self) -> Option<&str> {
        match self {
            WorkerEvent::SyncSuccess { id, .. }
            | WorkerEvent::SyncFailed { id, .. }
            | WorkerEvent::SyncRetry { id, .. } => Some(id),
            WorkerEvent::SyncComplete { .. } => None,
        }
    }

    /// Serializes the event to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl WorkerCommand {
    /// Serializes the command to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a command from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
