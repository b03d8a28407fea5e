// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.rollcall/config.toml` and includes:
//! - `[store]`: where the local database lives and its schema version
//! - `[api]`: the remote REST API the sync worker delivers to (optional)
//! - `[sync]`: retry budget and coordinator timeouts

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rollcall_core::{offline_queue_schema, StoreConfig};

use crate::error::{Error, Result};
use crate::sync::CoordinatorConfig;

const WORK_DIR_NAME: &str = ".rollcall";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Project configuration stored in `.rollcall/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSettings,
    /// Remote API (optional - if absent, operations stay staged locally).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Local database settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Database file, relative to the project root or absolute.
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_store_name")]
    pub name: String,
    /// Schema version. Raising it upgrades the store on next open.
    #[serde(default = "default_store_version")]
    pub version: u32,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL that relative endpoints are joined onto.
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Sync worker and coordinator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    /// Delivery attempts per operation before a transient failure is final.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// How long `sync` waits for the worker to finish a pass.
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    /// Pause between passes of a single `rollcall sync`.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_store_path() -> String {
    format!("{}/local.db", WORK_DIR_NAME)
}

fn default_store_name() -> String {
    "rollcall".to_string()
}

fn default_store_version() -> u32 {
    1
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_reply_timeout_ms() -> u64 {
    30_000
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            path: default_store_path(),
            name: default_store_name(),
            version: default_store_version(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_attempts: default_max_attempts(),
            reply_timeout_ms: default_reply_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into(),
            token: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl SyncSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Coordinator settings derived from this section.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            max_attempts: self.max_attempts,
            reply_timeout: Duration::from_millis(self.reply_timeout_ms),
        }
    }
}

impl Config {
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(Error::NotInitialized);
        }
        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.store.version == 0 {
            return Err(Error::Config("store.version must be at least 1".to_string()));
        }
        if self.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".to_string()));
        }
        if let Some(api) = &self.api {
            if !api.base_url.starts_with("http://") && !api.base_url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "invalid api.base_url '{}': must start with http:// or https://",
                    api.base_url
                )));
            }
        }
        Ok(())
    }

    /// Store layout: the offline queue plus nothing else the CLI owns.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.store.name.clone(), self.store.version)
            .collection(offline_queue_schema())
    }

    pub fn api(&self) -> Result<&ApiConfig> {
        self.api.as_ref().ok_or(Error::NoApi)
    }
}

/// Find the .rollcall directory by walking up from current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the database path from config
pub fn get_db_path(work_dir: &Path, config: &Config) -> PathBuf {
    let path = Path::new(&config.store.path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        // Relative to work_dir's parent (the project root)
        work_dir.parent().unwrap_or(work_dir).join(path)
    }
}

/// Create `.rollcall/` under `path` and write the given config into it.
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);
    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }
    config.validate()?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    Ok(work_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
