// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rollcall-core: Shared library for the rollcall offline client
//!
//! This crate provides the local structured store, the durable offline
//! queue, and the message types exchanged with the background sync worker.

pub mod error;
pub mod key;
pub mod op;
pub mod outbox;
pub mod protocol;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use key::{Key, KeyQuery, KeyRange};
pub use op::{Method, OpStatus, QueuedOperation};
pub use outbox::{offline_queue_schema, Outbox, BY_TIMESTAMP, OFFLINE_QUEUE};
pub use protocol::{FailureReason, WorkerCommand, WorkerEvent};
pub use schema::{CollectionSchema, IndexSchema, StoreConfig};
pub use store::{Collection, LocalStore, TxScope};
