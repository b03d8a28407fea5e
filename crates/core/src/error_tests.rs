// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_initialized = { Error::NotInitialized, "not initialized" },
    unknown_collection = { Error::UnknownCollection("members".into()), "members" },
    upgrade_blocked = { Error::UpgradeBlocked { version: 4 }, "version 4" },
    not_in_scope = { Error::NotInScope("events".into()), "events" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_version_downgrade_display() {
    let err = Error::VersionDowngrade {
        stored: 3,
        requested: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains("version 2"));
    assert!(msg.contains("stored version is 3"));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_rusqlite() {
    let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, Error::Database(_)));
}
