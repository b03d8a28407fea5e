// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod enqueue;
pub mod init;
pub mod queue;
pub mod sync;

use std::path::PathBuf;

use rollcall_core::LocalStore;
use tracing::debug;

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;

/// Helper to open the local store from the current context.
pub fn open_store() -> Result<(LocalStore, Config, PathBuf)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let db_path = get_db_path(&work_dir, &config);
    debug!(path = %db_path.display(), "opening store");
    let mut store = LocalStore::new();
    store.initialize(&db_path, &config.store_config())?;
    Ok((store, config, work_dir))
}
