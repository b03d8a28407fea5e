// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rollcall_core::{Outbox, QueuedOperation};

use super::open_store;
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(format: OutputFormat) -> Result<()> {
    let (mut store, _, _) = open_store()?;
    let ops = Outbox::new(&mut store).all()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ops)?),
        OutputFormat::Text => {
            if ops.is_empty() {
                println!("No staged operations");
            }
            for op in &ops {
                println!("{}", format_line(op));
            }
        }
    }
    Ok(())
}

/// One line per operation: `id  METHOD endpoint  [status]`.
pub(crate) fn format_line(op: &QueuedOperation) -> String {
    let mut line = format!("{}  {} {}  [{}]", op.id, op.method, op.endpoint, op.status);
    if op.retry_count > 0 {
        line.push_str(&format!(" retries={}", op.retry_count));
    }
    if let Some(ts) = op.timestamp {
        line.push_str(&format!("  {}", ts.format("%Y-%m-%d %H:%M:%S")));
    }
    line
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
