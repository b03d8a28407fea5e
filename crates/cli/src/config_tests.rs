// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_init_and_load_config() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.api = Some(ApiConfig::new("https://api.example.com"));

    let work_dir = init_work_dir(temp.path(), &config).unwrap();

    assert_eq!(work_dir, temp.path().join(".rollcall"));
    assert_eq!(Config::load(&work_dir).unwrap(), config);
}

#[test]
fn test_already_initialized() {
    let temp = TempDir::new().unwrap();
    init_work_dir(temp.path(), &Config::default()).unwrap();

    let result = init_work_dir(temp.path(), &Config::default());
    assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
}

#[test]
fn test_init_succeeds_with_empty_rollcall_dir() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join(".rollcall")).unwrap();

    assert!(init_work_dir(temp.path(), &Config::default()).is_ok());
}

#[test]
fn test_load_missing_config() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(Config::load(temp.path()), Err(Error::NotInitialized)));
}

#[test]
fn test_defaults_fill_partial_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[api]\nbase_url = \"http://localhost:8080\"\n",
    )
    .unwrap();

    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config.store, StoreSettings::default());
    assert_eq!(config.sync.max_attempts, 3);
    assert_eq!(config.sync.reply_timeout_ms, 30_000);
    let api = config.api().unwrap();
    assert_eq!(api.request_timeout(), Duration::from_secs(10));
    assert!(api.token.is_none());
}

#[parameterized(
    zero_version = { "[store]\nversion = 0\n" },
    zero_attempts = { "[sync]\nmax_attempts = 0\n" },
    bad_scheme = { "[api]\nbase_url = \"ftp://example.com\"\n" },
    malformed = { "[store\n" },
)]
fn test_invalid_config_rejected(content: &str) {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), content).unwrap();

    assert!(matches!(Config::load(temp.path()), Err(Error::Config(_))));
}

#[test]
fn test_missing_api_is_reported() {
    let config = Config::default();
    assert!(matches!(config.api(), Err(Error::NoApi)));
}

#[test]
fn test_db_path_relative_to_project_root() {
    let work_dir = PathBuf::from("/project/.rollcall");
    let config = Config::default();
    assert_eq!(
        get_db_path(&work_dir, &config),
        PathBuf::from("/project/.rollcall/local.db")
    );
}

#[test]
fn test_db_path_absolute() {
    let work_dir = PathBuf::from("/project/.rollcall");
    let mut config = Config::default();
    config.store.path = "/var/lib/rollcall/store.db".to_string();
    assert_eq!(
        get_db_path(&work_dir, &config),
        PathBuf::from("/var/lib/rollcall/store.db")
    );
}

#[test]
fn test_store_config_includes_offline_queue() {
    let mut config = Config::default();
    config.store.version = 4;

    let store_config = config.store_config();
    assert_eq!(store_config.version, 4);
    assert_eq!(store_config.name, "rollcall");
    assert!(store_config
        .collections
        .iter()
        .any(|c| c.name == rollcall_core::OFFLINE_QUEUE));
}

#[test]
fn test_coordinator_config_from_sync_settings() {
    let settings = SyncSettings {
        max_attempts: 5,
        reply_timeout_ms: 1500,
        retry_delay_ms: 0,
    };
    let coordinator = settings.coordinator_config();
    assert_eq!(coordinator.max_attempts, 5);
    assert_eq!(coordinator.reply_timeout, Duration::from_millis(1500));
    assert_eq!(settings.retry_delay(), Duration::ZERO);
}
