// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use rollcall_core::{Method, Outbox, QueuedOperation};
use serde_json::Value;

use super::open_store;
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::sync::{Enqueued, SyncCoordinator};

pub fn run(method: &str, endpoint: &str, payload: Option<&str>, id: Option<String>) -> Result<()> {
    let method: Method = method.parse()?;
    let payload = payload.map(parse_payload).transpose()?;

    let (mut store, config, _) = open_store()?;
    let id = match id {
        Some(id) => id,
        None => {
            let outbox = Outbox::new(&mut store);
            generate_unique_id(method, endpoint, &Utc::now(), |candidate| {
                matches!(outbox.get(candidate), Ok(Some(_)))
            })
        }
    };

    let mut op = QueuedOperation::new(id, method, endpoint);
    if let Some(payload) = payload {
        op = op.with_payload(payload);
    }

    // No worker is started here, so the coordinator stages into the outbox.
    let mut coordinator = SyncCoordinator::new(config.sync.coordinator_config()).with_outbox(store);
    match coordinator.enqueue(op.clone())? {
        Enqueued::Dropped => Err(Error::InvalidInput(format!(
            "operation {} was not staged",
            op.id
        ))),
        _ => {
            println!("Staged {} {} {}", op.id, op.method, op.endpoint);
            Ok(())
        }
    }
}

/// Parses a JSON request body. Only objects and arrays are accepted.
pub(crate) fn parse_payload(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidInput(format!("invalid payload: {}", e)))?;
    if !value.is_object() && !value.is_array() {
        return Err(Error::InvalidInput(
            "invalid payload: expected a JSON object or array".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
