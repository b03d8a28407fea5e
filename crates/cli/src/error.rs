// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the rollcall library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'rollcall init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("store error: {0}")]
    Core(rollcall_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("sync worker did not finish the pass within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("sync worker is no longer running")]
    WorkerGone,

    #[error("{0}")]
    InvalidInput(String),

    #[error("no API configured\n  hint: set [api] base_url in .rollcall/config.toml")]
    NoApi,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<rollcall_core::Error> for Error {
    fn from(e: rollcall_core::Error) -> Self {
        match e {
            rollcall_core::Error::NotInitialized => Error::NotInitialized,
            rollcall_core::Error::Io(e) => Error::Io(e),
            rollcall_core::Error::Json(e) => Error::Json(e),
            rollcall_core::Error::InvalidMethod(s) => Error::InvalidInput(format!(
                "invalid method: '{}'\n  hint: valid methods are: GET, POST, PUT, DELETE, PATCH",
                s
            )),
            other => Error::Core(other),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
