// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn enqueue_stages_operation() {
    let temp = init_temp();

    rollcall()
        .arg("enqueue")
        .arg("POST")
        .arg("/members")
        .arg("--payload")
        .arg(r#"{"name":"Ana"}"#)
        .arg("--id")
        .arg("op1")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged op1 POST /members"));

    let ops = queue_json(&temp);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["id"], "op1");
    assert_eq!(ops[0]["method"], "POST");
    assert_eq!(ops[0]["payload"]["name"], "Ana");
    assert_eq!(ops[0]["status"], "pending");
    assert!(ops[0]["timestamp"].is_i64());
}

#[test]
fn enqueue_generates_id_when_omitted() {
    let temp = init_temp();

    rollcall()
        .arg("enqueue")
        .arg("delete")
        .arg("/centers/2")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged op-"));

    let ops = queue_json(&temp);
    assert_eq!(ops.len(), 1);
    assert!(ops[0]["id"].as_str().unwrap().starts_with("op-"));
    assert_eq!(ops[0]["method"], "DELETE");
}

#[parameterized(
    bad_method = { &["enqueue", "FETCH", "/members"], "invalid method" },
    bad_payload = { &["enqueue", "POST", "/members", "--payload", "{oops"], "invalid payload" },
    scalar_payload = { &["enqueue", "POST", "/members", "--payload", "7"], "invalid payload" },
)]
fn enqueue_rejects_bad_input(args: &[&str], message: &str) {
    let temp = init_temp();

    rollcall()
        .args(args)
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));

    assert!(queue_json(&temp).is_empty());
}

#[test]
fn enqueue_rejects_empty_endpoint() {
    let temp = init_temp();

    rollcall()
        .arg("enqueue")
        .arg("POST")
        .arg(" ")
        .current_dir(temp.path())
        .assert()
        .failure();
}

#[test]
fn queue_lists_oldest_first() {
    let temp = init_temp();
    enqueue(&temp, "POST", "/members", "zz-first", None);
    std::thread::sleep(std::time::Duration::from_millis(5));
    enqueue(&temp, "PUT", "/events/5", "aa-second", Some(r#"{"title":"Retreat"}"#));

    let ids: Vec<_> = queue_json(&temp)
        .iter()
        .map(|op| op["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["zz-first", "aa-second"]);

    rollcall()
        .arg("queue")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("zz-first  POST /members  [pending]"))
        .stdout(predicate::str::contains("aa-second  PUT /events/5  [pending]"));
}

#[test]
fn reenqueue_same_id_replaces() {
    let temp = init_temp();
    enqueue(&temp, "POST", "/members", "op1", None);
    enqueue(&temp, "PATCH", "/members/9", "op1", None);

    let ops = queue_json(&temp);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["endpoint"], "/members/9");
}

#[test]
fn clear_empties_queue() {
    let temp = init_temp();
    enqueue(&temp, "POST", "/members", "op1", None);
    enqueue(&temp, "POST", "/members", "op2", None);

    rollcall()
        .arg("clear")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 staged operations"));

    assert!(queue_json(&temp).is_empty());
}

#[test]
fn sync_without_api_fails_with_hint() {
    let temp = init_temp();
    enqueue(&temp, "POST", "/members", "op1", None);

    rollcall()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API configured"));

    assert_eq!(queue_json(&temp).len(), 1);
}
