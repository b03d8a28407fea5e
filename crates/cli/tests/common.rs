// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn rollcall() -> Command {
    let mut cmd = cargo_bin_cmd!("rollcall");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized temp directory without an API
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    rollcall()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create an initialized temp directory pointed at `base_url`,
/// with no pause between sync passes.
pub fn init_temp_with_api(base_url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    rollcall()
        .arg("init")
        .arg("--api")
        .arg(base_url)
        .current_dir(temp.path())
        .assert()
        .success();

    let config_path = temp.path().join(".rollcall/config.toml");
    let config = std::fs::read_to_string(&config_path).unwrap();
    let config = config.replace("retry_delay_ms = 1000", "retry_delay_ms = 0");
    std::fs::write(&config_path, config).unwrap();
    temp
}

/// Stage an operation with a fixed id.
pub fn enqueue(temp: &TempDir, method: &str, endpoint: &str, id: &str, payload: Option<&str>) {
    let mut cmd = rollcall();
    cmd.arg("enqueue").arg(method).arg(endpoint).arg("--id").arg(id);
    if let Some(payload) = payload {
        cmd.arg("--payload").arg(payload);
    }
    cmd.current_dir(temp.path()).assert().success();
}

/// Staged operations as JSON.
pub fn queue_json(temp: &TempDir) -> Vec<serde_json::Value> {
    let output = rollcall()
        .arg("queue")
        .arg("--format")
        .arg("json")
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}
