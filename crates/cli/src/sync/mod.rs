// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background sync of queued operations to the remote REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  commands  ┌─────────────┐     ┌─────────────┐
//! │  Coordinator  │───────────►│   Worker    │────►│  Transport  │──► REST API
//! │(SyncCoordin.) │◄───────────│ (SyncEngine)│◄────│   (trait)   │
//! └───────────────┘   events   └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌───────────────┐
//! │    Outbox     │  (offline_queue collection in the local store)
//! └───────────────┘
//! ```
//!
//! # Features
//!
//! - Dedicated worker thread; the engine's queue is touched nowhere else
//! - Bounded retries for 5xx, 429 and network failures
//! - Durable outbox replayed on start
//! - Reply timeout on `sync`
//! - Injectable transport trait for testing

mod coordinator;
mod engine;
mod transport;
mod worker;

pub use coordinator::{CoordinatorConfig, Enqueued, SyncCoordinator, SyncReport};
pub use engine::{PassSummary, SyncEngine, DEFAULT_MAX_ATTEMPTS};
pub use transport::{
    classify, DeliverFuture, HttpTransport, Outcome, Transport, TransportError, TransportResult,
};
pub use worker::WorkerHandle;

#[cfg(test)]
mod test_helpers;
