// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rollcall - offline-first outbox and background sync library.
//!
//! This crate provides the sync side of the `rollcall` CLI: operations
//! against the registration REST API are staged in a local store and a
//! background worker delivers them with bounded retries.
//!
//! # Main Components
//!
//! - [`SyncCoordinator`] - Starts the worker, forwards operations, collects pass reports
//! - [`SyncEngine`] - The retrying in-memory queue the worker drives
//! - [`HttpTransport`] - reqwest-backed [`Transport`]
//! - [`Config`] - Project configuration (`.rollcall/config.toml`)
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use rollcall::{find_work_dir, get_db_path, Config, HttpTransport, SyncCoordinator};
//! use rollcall_core::{LocalStore, Method, QueuedOperation};
//!
//! let work_dir = find_work_dir()?;
//! let config = Config::load(&work_dir)?;
//! let mut store = LocalStore::new();
//! store.initialize(&get_db_path(&work_dir, &config), &config.store_config())?;
//!
//! let mut coordinator = SyncCoordinator::new(config.sync.coordinator_config()).with_outbox(store);
//! coordinator.initialize(HttpTransport::new(config.api()?)?)?;
//! coordinator.enqueue(QueuedOperation::new("op1", Method::Post, "/members"))?;
//! let report = coordinator.sync().await?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod id;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{find_work_dir, get_db_path, init_work_dir, ApiConfig, Config};
pub use error::{Error, Result};
pub use sync::{
    CoordinatorConfig, Enqueued, HttpTransport, SyncCoordinator, SyncEngine, SyncReport, Transport,
};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { api, token } => commands::init::run(api, token),
        Command::Enqueue {
            method,
            endpoint,
            payload,
            id,
        } => commands::enqueue::run(&method, &endpoint, payload.as_deref(), id),
        Command::Queue { format } => commands::queue::run(format),
        Command::Sync { once } => commands::sync::run(once),
        Command::Clear => commands::clear::run(),
    }
}
