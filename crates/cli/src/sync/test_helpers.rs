// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rollcall_core::{Method, QueuedOperation};

use super::transport::{DeliverFuture, Transport, TransportError, TransportResult};

/// Create a test operation.
pub fn make_op(id: &str, method: Method, endpoint: &str) -> QueuedOperation {
    QueuedOperation::new(id, method, endpoint)
}

/// Scripted response for one delivery attempt.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Network,
    BadUrl,
}

/// Mock transport answering per endpoint from a script.
///
/// Each endpoint has a queue of replies; the last reply repeats once the
/// queue is down to one entry. Endpoints without a script answer 200.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    /// Endpoints in the order they were attempted.
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    slow: Arc<Mutex<HashMap<String, Duration>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with the given replies in order.
    pub fn on(self, endpoint: &str, replies: &[Reply]) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), replies.iter().cloned().collect());
        self
    }

    /// Answer `endpoint` with `status` forever.
    pub fn always(self, endpoint: &str, status: u16) -> Self {
        self.on(endpoint, &[Reply::Status(status)])
    }

    /// Sleep before answering every request.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering requests to `endpoint` only.
    pub fn slow(self, endpoint: &str, delay: Duration) -> Self {
        self.slow.lock().unwrap().insert(endpoint.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempts(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|e| *e == endpoint).count()
    }

    fn next_reply(&self, endpoint: &str) -> Reply {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(endpoint) {
            Some(replies) if replies.len() > 1 => replies.pop_front().unwrap(),
            Some(replies) => replies.front().cloned().unwrap_or(Reply::Status(200)),
            None => Reply::Status(200),
        }
    }
}

impl Transport for ScriptedTransport {
    fn deliver<'a>(&'a self, op: &'a QueuedOperation) -> DeliverFuture<'a> {
        Box::pin(async move {
            let slow = self.slow.lock().unwrap().get(&op.endpoint).copied();
            if let Some(delay) = self.delay.or(slow) {
                tokio::time::sleep(delay).await;
            }
            self.calls.lock().unwrap().push(op.endpoint.clone());
            let reply: TransportResult<u16> = match self.next_reply(&op.endpoint) {
                Reply::Status(status) => Ok(status),
                Reply::Network => {
                    Err(TransportError::ConnectionFailed("connection refused".into()))
                }
                Reply::BadUrl => Err(TransportError::InvalidUrl(op.endpoint.clone())),
            };
            reply
        })
    }
}
