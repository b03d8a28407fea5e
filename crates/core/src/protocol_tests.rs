// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::op::Method;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    sync = { WorkerCommand::Sync { pass: 4 }, "SYNC" },
    clear = { WorkerCommand::ClearTasks, "CLEAR_TASKS" },
    add = {
        WorkerCommand::AddTask(QueuedOperation::new("op-1", Method::Post, "/members")),
        "ADD_TASK"
    },
)]
fn command_wire_tag(command: WorkerCommand, tag: &str) {
    let value: serde_json::Value = serde_json::from_str(&command.to_json().unwrap()).unwrap();
    assert_eq!(value["type"], tag);
    assert_eq!(WorkerCommand::from_json(&command.to_json().unwrap()).unwrap(), command);
}

#[test]
fn add_task_flattens_operation_fields() {
    let command = WorkerCommand::AddTask(
        QueuedOperation::new("op-1", Method::Put, "/events/5")
            .with_payload(json!({"title": "Retreat"})),
    );
    let value: serde_json::Value = serde_json::from_str(&command.to_json().unwrap()).unwrap();
    assert_eq!(value["id"], "op-1");
    assert_eq!(value["method"], "PUT");
    assert_eq!(value["endpoint"], "/events/5");
    assert_eq!(value["payload"]["title"], "Retreat");
}

#[test]
fn sync_failed_wire_format() {
    let event = WorkerEvent::SyncFailed {
        id: "op-3".into(),
        reason: FailureReason::ClientError,
        status: Some(403),
        error: None,
    };
    let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"type": "SYNC_FAILED", "id": "op-3", "reason": "client_error", "status": 403})
    );
}

#[test]
fn sync_complete_round_trip() {
    let json = r#"{"type":"SYNC_COMPLETE","pass":2,"remaining":1,"failed":1}"#;
    let event = WorkerEvent::from_json(json).unwrap();
    assert_eq!(
        event,
        WorkerEvent::SyncComplete {
            pass: 2,
            remaining: 1,
            failed: 1
        }
    );
    assert_eq!(event.op_id(), None);
}

#[test]
fn pass_number_defaults_to_zero() {
    assert_eq!(
        WorkerCommand::from_json(r#"{"type":"SYNC"}"#).unwrap(),
        WorkerCommand::Sync { pass: 0 }
    );
    let event = WorkerEvent::from_json(r#"{"type":"SYNC_COMPLETE","remaining":0,"failed":0}"#);
    assert!(matches!(event.unwrap(), WorkerEvent::SyncComplete { pass: 0, .. }));
}

#[test]
fn sync_retry_wire_format() {
    let event = WorkerEvent::SyncRetry {
        id: "op-2".into(),
        retry_count: 2,
    };
    let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
    assert_eq!(value, json!({"type": "SYNC_RETRY", "id": "op-2", "retry_count": 2}));
    assert_eq!(event.op_id(), Some("op-2"));
}

#[parameterized(
    client = { FailureReason::ClientError, "client_error" },
    max_retries = { FailureReason::MaxRetriesExceeded, "max_retries_exceeded" },
    network = { FailureReason::NetworkError, "network_error" },
)]
fn failure_reason_strings(reason: FailureReason, expected: &str) {
    assert_eq!(reason.to_string(), expected);
    assert_eq!(serde_json::to_value(reason).unwrap(), json!(expected));
}

#[test]
fn op_id_for_item_events() {
    let success = WorkerEvent::SyncSuccess {
        id: "op-1".into(),
        status: 201,
    };
    assert_eq!(success.op_id(), Some("op-1"));
}
