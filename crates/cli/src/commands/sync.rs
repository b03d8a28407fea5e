// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rollcall_core::WorkerEvent;
use tracing::info;

use super::open_store;
use crate::error::{Error, Result};
use crate::sync::{HttpTransport, SyncCoordinator, SyncReport};

pub fn run(once: bool) -> Result<()> {
    let (store, config, _) = open_store()?;
    let transport = HttpTransport::new(config.api()?)?;

    let mut coordinator = SyncCoordinator::new(config.sync.coordinator_config()).with_outbox(store);
    if !coordinator.initialize(transport)? {
        println!("Sync unavailable; operations stay staged");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    // Every pending item is attempted once per pass and retry counts persist
    // in the outbox, so max_attempts passes bring each one to a terminal outcome.
    let passes = if once { 1 } else { config.sync.max_attempts };
    let delay = config.sync.retry_delay();
    let result = runtime.block_on(async {
        for pass in 1..=passes {
            let report = coordinator.sync().await?;
            print_report(pass, &report);
            if report.remaining == 0 || pass == passes {
                break;
            }
            info!(remaining = report.remaining, "retrying after {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        Ok::<(), Error>(())
    });

    coordinator.terminate();
    result
}

fn print_report(pass: u32, report: &SyncReport) {
    for outcome in &report.outcomes {
        println!("{}", format_outcome(outcome));
    }
    println!(
        "pass {}: {} delivered, {} failed, {} remaining",
        pass,
        report.succeeded(),
        report.failed,
        report.remaining
    );
}

pub(crate) fn format_outcome(event: &WorkerEvent) -> String {
    match event {
        WorkerEvent::SyncSuccess { id, status } => format!("delivered {} ({})", id, status),
        WorkerEvent::SyncFailed {
            id,
            reason,
            status,
            error,
        } => {
            let detail = match (status, error) {
                (Some(status), _) => format!(" ({})", status),
                (None, Some(error)) => format!(": {}", error),
                (None, None) => String::new(),
            };
            format!("failed {} [{}]{}", id, reason, detail)
        }
        WorkerEvent::SyncRetry { id, retry_count } => {
            format!("retrying {} (retries={})", id, retry_count)
        }
        WorkerEvent::SyncComplete {
            remaining, failed, ..
        } => {
            format!("complete: {} failed, {} remaining", failed, remaining)
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
