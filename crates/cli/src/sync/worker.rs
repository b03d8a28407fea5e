// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background thread that owns the sync engine.
//!
//! The worker runs a current-thread tokio runtime on a dedicated OS thread.
//! Commands arrive over one channel and are handled one at a time, so two
//! `SYNC` requests never overlap. Events flow back over a second channel.

use std::io;
use std::thread::JoinHandle;

use rollcall_core::{WorkerCommand, WorkerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::engine::SyncEngine;
use super::transport::Transport;

/// Handle to a running worker thread.
pub struct WorkerHandle {
    commands: Option<mpsc::UnboundedSender<WorkerCommand>>,
    events: mpsc::UnboundedReceiver<WorkerEvent>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns the worker thread.
    ///
    /// Fails only if the OS refuses to create the thread.
    pub fn spawn(engine: SyncEngine, transport: Box<dyn Transport>) -> io::Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let thread = std::thread::Builder::new()
            .name("rollcall-sync".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                let runtime = match runtime {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("sync worker could not start its runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(run(engine, transport, command_rx, event_tx, worker_cancel));
            })?;

        Ok(WorkerHandle {
            commands: Some(command_tx),
            events: event_rx,
            cancel,
            thread: Some(thread),
        })
    }

    /// Queues a command for the worker. Returns false if the worker is gone.
    pub fn send(&self, command: WorkerCommand) -> bool {
        match &self.commands {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }

    /// Next event, waiting until one arrives. `None` once the worker exited.
    pub async fn recv(&mut self) -> Option<WorkerEvent> {
        self.events.recv().await
    }

    /// Next event if one is already waiting.
    pub fn try_recv(&mut self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }

    /// Stops the worker and waits for its thread to exit.
    ///
    /// A pass in progress is abandoned at its next await point; items it has
    /// not finished stay exactly as they were.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        self.commands.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("sync worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run(
    mut engine: SyncEngine,
    transport: Box<dyn Transport>,
    mut commands: mpsc::UnboundedReceiver<WorkerCommand>,
    events: mpsc::UnboundedSender<WorkerEvent>,
    cancel: CancellationToken,
) {
    debug!("sync worker started");
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            WorkerCommand::AddTask(op) => engine.add_task(op),
            WorkerCommand::ClearTasks => engine.clear_tasks(),
            WorkerCommand::Sync { pass } => {
                let running = engine.sync_pass(pass, transport.as_ref(), &cancel, |event| {
                    // Receiver gone means nobody is waiting; keep draining commands.
                    let _ = events.send(event);
                });
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = running => {}
                }
            }
        }
    }
    debug!(pending = engine.len(), "sync worker stopped");
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
