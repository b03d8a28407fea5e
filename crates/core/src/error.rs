// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rollcall-core operations.

use thiserror::Error;

/// All possible errors that can occur in rollcall-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store not initialized\n  hint: call initialize() before using the store")]
    NotInitialized,

    #[error("local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("upgrade to version {version} blocked by another open connection")]
    UpgradeBlocked { version: u32 },

    #[error("cannot open database at version {requested}: stored version is {stored}")]
    VersionDowngrade { stored: u32, requested: u32 },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("unknown collection: '{0}'")]
    UnknownCollection(String),

    #[error("unknown index '{index}' on collection '{collection}'")]
    UnknownIndex { collection: String, index: String },

    #[error("collection '{0}' is not part of this transaction's scope")]
    NotInScope(String),

    #[error("duplicate key in '{collection}': {key}")]
    DuplicateKey { collection: String, key: String },

    #[error("unique index '{index}' on '{collection}' already contains {key}")]
    UniqueViolation {
        collection: String,
        index: String,
        key: String,
    },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, DELETE, PATCH")]
    InvalidMethod(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, synced, failed")]
    InvalidStatus(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rollcall-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
