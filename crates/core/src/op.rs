// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued operations awaiting delivery to the remote API.
//!
//! A [`QueuedOperation`] is one pending network mutation. The same value is
//! persisted in the offline queue collection and held in the sync engine's
//! in-memory queue, so it must stay serializable in both directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// HTTP verb used to deliver an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read a resource.
    Get,
    /// Create a resource.
    Post,
    /// Replace a resource.
    Put,
    /// Delete a resource.
    Delete,
    /// Partially update a resource.
    Patch,
}

impl Method {
    /// Returns the canonical HTTP verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Delivery status of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpStatus {
    /// Waiting for (another) delivery attempt.
    #[default]
    Pending,
    /// Delivered successfully.
    Synced,
    /// Terminally failed.
    Failed,
}

impl OpStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpStatus::Pending => "pending",
            OpStatus::Synced => "synced",
            OpStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OpStatus::Pending),
            "synced" => Ok(OpStatus::Synced),
            "failed" => Ok(OpStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// One pending mutation against the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedOperation {
    /// Unique identifier within the queue.
    pub id: String,
    /// Logical resource path, used verbatim as the request URL.
    pub endpoint: String,
    /// HTTP verb.
    pub method: Method,
    /// Optional JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// When the operation was enqueued (milliseconds since the epoch on the wire).
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Number of transient failures that have been retried so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Current delivery status.
    #[serde(default)]
    pub status: OpStatus,
}

impl QueuedOperation {
    /// Creates a pending operation with no payload.
    pub fn new(id: impl Into<String>, method: Method, endpoint: impl Into<String>) -> Self {
        QueuedOperation {
            id: id.into(),
            endpoint: endpoint.into(),
            method,
            payload: None,
            timestamp: None,
            retry_count: 0,
            status: OpStatus::Pending,
        }
    }

    /// Attaches a JSON body.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the enqueue timestamp if none has been assigned yet.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        if self.timestamp.is_none() {
            self.timestamp = Some(now);
        }
    }

    /// Returns true while the operation is still awaiting delivery.
    pub fn is_pending(&self) -> bool {
        self.status == OpStatus::Pending
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
