// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rollcall_core::Outbox;

use super::open_store;
use crate::error::Result;
use crate::sync::SyncCoordinator;

pub fn run() -> Result<()> {
    let (mut store, config, _) = open_store()?;
    let count = Outbox::new(&mut store).len()?;

    let mut coordinator = SyncCoordinator::new(config.sync.coordinator_config()).with_outbox(store);
    coordinator.clear()?;

    println!("Cleared {} staged operation{}", count, if count == 1 { "" } else { "s" });
    Ok(())
}
