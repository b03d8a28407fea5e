// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn test_error_not_initialized_display() {
    let err = Error::NotInitialized;
    assert!(err.to_string().contains("not initialized"));
    assert!(err.to_string().contains("rollcall init"));
}

#[test]
fn test_error_already_initialized_display() {
    let err = Error::AlreadyInitialized("/path/to/.rollcall".to_string());
    assert!(err.to_string().contains("already initialized"));
    assert!(err.to_string().contains("/path/to/.rollcall"));
}

#[test]
fn test_error_timeout_display() {
    let err = Error::Timeout { timeout_ms: 250 };
    assert!(err.to_string().contains("250ms"));
}

#[test]
fn test_error_no_api_has_hint() {
    let err = Error::NoApi;
    assert!(err.to_string().contains("hint"));
    assert!(err.to_string().contains("base_url"));
}

#[test]
fn test_core_not_initialized_maps_to_cli_variant() {
    let err: Error = rollcall_core::Error::NotInitialized.into();
    assert!(matches!(err, Error::NotInitialized));
}

#[test]
fn test_core_invalid_method_lists_methods() {
    let err: Error = rollcall_core::Error::InvalidMethod("FETCH".into()).into();
    let msg = err.to_string();
    assert!(msg.contains("FETCH"));
    assert!(msg.contains("PATCH"));
}

#[test]
fn test_core_store_errors_are_wrapped() {
    let err: Error = rollcall_core::Error::UnknownCollection("members".into()).into();
    assert!(matches!(err, Error::Core(_)));
    assert!(err.to_string().contains("members"));
}

#[test]
fn test_error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(err.to_string().contains("io error"));
}

#[test]
fn test_error_from_toml() {
    let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
    let err: Error = toml_err.into();
    assert!(matches!(err, Error::Config(_)));
}
