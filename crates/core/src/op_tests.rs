// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    get = { "GET", Method::Get },
    post_lower = { "post", Method::Post },
    put = { "Put", Method::Put },
    delete = { "DELETE", Method::Delete },
    patch = { "patch", Method::Patch },
)]
fn method_from_str(input: &str, expected: Method) {
    assert_eq!(input.parse::<Method>().unwrap(), expected);
}

#[test]
fn method_rejects_unknown_verb() {
    let err = "OPTIONS".parse::<Method>().unwrap_err();
    assert!(matches!(err, Error::InvalidMethod(ref m) if m == "OPTIONS"));
}

#[parameterized(
    pending = { OpStatus::Pending, "pending" },
    synced = { OpStatus::Synced, "synced" },
    failed = { OpStatus::Failed, "failed" },
)]
fn status_round_trips_through_str(status: OpStatus, text: &str) {
    assert_eq!(status.as_str(), text);
    assert_eq!(text.parse::<OpStatus>().unwrap(), status);
}

#[test]
fn new_operation_starts_pending_with_zero_retries() {
    let op = QueuedOperation::new("op-1", Method::Post, "/members");
    assert_eq!(op.retry_count, 0);
    assert_eq!(op.status, OpStatus::Pending);
    assert!(op.timestamp.is_none());
    assert!(op.is_pending());
}

#[test]
fn stamp_keeps_existing_timestamp() {
    let first = Utc.timestamp_millis_opt(1_000).unwrap();
    let later = Utc.timestamp_millis_opt(9_000).unwrap();

    let mut op = QueuedOperation::new("op-1", Method::Put, "/events/5");
    op.stamp(first);
    op.stamp(later);

    assert_eq!(op.timestamp, Some(first));
}

#[test]
fn serializes_timestamp_as_millis_and_method_uppercase() {
    let mut op = QueuedOperation::new("op-1", Method::Patch, "/centers/2")
        .with_payload(json!({"name": "North"}));
    op.stamp(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());

    let value = serde_json::to_value(&op).unwrap();
    assert_eq!(value["method"], "PATCH");
    assert_eq!(value["timestamp"], 1_700_000_000_123i64);
    assert_eq!(value["status"], "pending");
    assert_eq!(value["payload"]["name"], "North");
}

#[test]
fn deserializes_minimal_operation_with_defaults() {
    let op: QueuedOperation = serde_json::from_value(json!({
        "id": "op-9",
        "endpoint": "/members",
        "method": "DELETE"
    }))
    .unwrap();

    assert_eq!(op.method, Method::Delete);
    assert_eq!(op.retry_count, 0);
    assert_eq!(op.status, OpStatus::Pending);
    assert!(op.payload.is_none());
    assert!(op.timestamp.is_none());
}
