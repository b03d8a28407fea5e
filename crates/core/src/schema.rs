// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store schema declarations and the versioned upgrade path.
//!
//! Collections and indexes are declared up front in a [`StoreConfig`]. The
//! schema version lives in SQLite's `user_version` header field; opening at a
//! higher version runs a single upgrade transaction that creates whatever the
//! config declares but the file does not yet have.

use std::collections::{BTreeMap, HashSet};

use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key;

/// Bookkeeping tables shared by every collection.
pub const SCHEMA: &str = r#"
-- Database-level metadata (name)
CREATE TABLE IF NOT EXISTS rc_meta (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per declared collection
CREATE TABLE IF NOT EXISTS rc_collections (
    name TEXT PRIMARY KEY,
    key_path TEXT NOT NULL,
    auto_increment INTEGER NOT NULL DEFAULT 0,
    next_key INTEGER NOT NULL DEFAULT 1
);

-- Secondary index declarations (key_paths is a JSON array)
CREATE TABLE IF NOT EXISTS rc_indexes (
    collection TEXT NOT NULL,
    name TEXT NOT NULL,
    key_paths TEXT NOT NULL,
    is_unique INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (collection, name),
    FOREIGN KEY (collection) REFERENCES rc_collections(name)
);

-- Records, keyed by order-preserving encoded keys
CREATE TABLE IF NOT EXISTS rc_records (
    collection TEXT NOT NULL,
    key BLOB NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (collection, key)
) WITHOUT ROWID;

-- Index entries pointing back at record keys
CREATE TABLE IF NOT EXISTS rc_index_entries (
    collection TEXT NOT NULL,
    index_name TEXT NOT NULL,
    index_key BLOB NOT NULL,
    primary_key BLOB NOT NULL,
    PRIMARY KEY (collection, index_name, index_key, primary_key)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_entries_record ON rc_index_entries(collection, primary_key);
"#;

/// Declaration of a secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    /// One path for a simple index, several for a compound (array) key.
    pub key_paths: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl IndexSchema {
    pub fn new(name: impl Into<String>, key_path: impl Into<String>) -> Self {
        IndexSchema {
            name: name.into(),
            key_paths: vec![key_path.into()],
            unique: false,
        }
    }

    pub fn compound(name: impl Into<String>, key_paths: &[&str]) -> Self {
        IndexSchema {
            name: name.into(),
            key_paths: key_paths.iter().map(|p| p.to_string()).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Declaration of a record collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    #[serde(default = "default_key_path")]
    pub key_path: String,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

fn default_key_path() -> String {
    "id".to_string()
}

impl CollectionSchema {
    /// A collection keyed by `id`.
    pub fn new(name: impl Into<String>) -> Self {
        CollectionSchema {
            name: name.into(),
            key_path: default_key_path(),
            auto_increment: false,
            indexes: Vec::new(),
        }
    }

    pub fn key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = key_path.into();
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn index(mut self, index: IndexSchema) -> Self {
        self.indexes.push(index);
        self
    }

    /// Finds an index declaration by name.
    pub fn find_index(&self, name: &str) -> Option<&IndexSchema> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// Declaration of a whole local database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub collections: Vec<CollectionSchema>,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        StoreConfig {
            name: name.into(),
            version,
            collections: Vec::new(),
        }
    }

    pub fn collection(mut self, collection: CollectionSchema) -> Self {
        self.collections.push(collection);
        self
    }

    /// Checks the declaration for structural mistakes.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(Error::InvalidSchema("version must be at least 1".into()));
        }
        let mut names = HashSet::new();
        for collection in &self.collections {
            if collection.name.is_empty() {
                return Err(Error::InvalidSchema("collection name cannot be empty".into()));
            }
            if !names.insert(collection.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate collection '{}'",
                    collection.name
                )));
            }
            if !valid_path(&collection.key_path) {
                return Err(Error::InvalidSchema(format!(
                    "invalid key path '{}' on '{}'",
                    collection.key_path, collection.name
                )));
            }
            let mut index_names = HashSet::new();
            for index in &collection.indexes {
                if !index_names.insert(index.name.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate index '{}' on '{}'",
                        index.name, collection.name
                    )));
                }
                if index.key_paths.is_empty() || !index.key_paths.iter().all(|p| valid_path(p)) {
                    return Err(Error::InvalidSchema(format!(
                        "invalid key paths for index '{}' on '{}'",
                        index.name, collection.name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn valid_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(|segment| !segment.is_empty())
}

/// Returns true if the error means SQLite could not take a lock.
fn is_lock_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

/// Reads the schema version stored in the database header.
pub fn stored_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    u32::try_from(version)
        .map_err(|_| Error::CorruptedData(format!("invalid stored version {version}")))
}

/// Brings the database up to `config.version`.
///
/// Same version: nothing happens. Lower version: [`Error::VersionDowngrade`].
/// Higher version: missing collections and indexes are created in one
/// immediate transaction; a lock held by another connection surfaces as
/// [`Error::UpgradeBlocked`].
pub fn upgrade(conn: &mut Connection, config: &StoreConfig) -> Result<()> {
    config.validate()?;

    let stored = stored_version(conn)?;
    if stored > config.version {
        return Err(Error::VersionDowngrade {
            stored,
            requested: config.version,
        });
    }
    if stored == config.version {
        return Ok(());
    }

    let blocked = |e: rusqlite::Error| {
        if is_lock_error(&e) {
            Error::UpgradeBlocked {
                version: config.version,
            }
        } else {
            Error::Database(e)
        }
    };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(blocked)?;

    // Another connection may have finished the same upgrade while we waited.
    let stored = stored_version(&tx)?;
    if stored > config.version {
        return Err(Error::VersionDowngrade {
            stored,
            requested: config.version,
        });
    }
    if stored == config.version {
        return Ok(());
    }

    tracing::debug!(
        name = %config.name,
        from = stored,
        to = config.version,
        "upgrading local store"
    );

    tx.execute_batch(SCHEMA)?;
    tx.execute(
        "INSERT OR IGNORE INTO rc_meta (name, value) VALUES ('name', ?1)",
        params![config.name],
    )?;

    let existing = load_schemas(&tx)?;
    for collection in &config.collections {
        match existing.get(&collection.name) {
            None => create_collection(&tx, collection)?,
            Some(current) => {
                for index in &collection.indexes {
                    if current.find_index(&index.name).is_none() {
                        create_index(&tx, &collection.name, index)?;
                    }
                }
            }
        }
    }

    tx.pragma_update(None, "user_version", config.version)?;
    tx.commit().map_err(blocked)?;
    Ok(())
}

fn create_collection(conn: &Connection, schema: &CollectionSchema) -> Result<()> {
    tracing::debug!(collection = %schema.name, "creating collection");
    conn.execute(
        "INSERT INTO rc_collections (name, key_path, auto_increment) VALUES (?1, ?2, ?3)",
        params![schema.name, schema.key_path, schema.auto_increment],
    )?;
    for index in &schema.indexes {
        create_index(conn, &schema.name, index)?;
    }
    Ok(())
}

/// Declares an index and back-fills entries for records already present.
fn create_index(conn: &Connection, collection: &str, index: &IndexSchema) -> Result<()> {
    tracing::debug!(collection, index = %index.name, "creating index");
    conn.execute(
        "INSERT INTO rc_indexes (collection, name, key_paths, is_unique) VALUES (?1, ?2, ?3, ?4)",
        params![
            collection,
            index.name,
            serde_json::to_string(&index.key_paths)?,
            index.unique
        ],
    )?;

    let mut stmt = conn.prepare("SELECT key, value FROM rc_records WHERE collection = ?1")?;
    let rows = stmt
        .query_map(params![collection], |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for (primary_key, raw) in rows {
        let record: serde_json::Value = serde_json::from_str(&raw)?;
        let Some(index_key) = key::extract(&record, &index.key_paths)? else {
            continue;
        };
        let encoded = index_key.encode();
        if index.unique && !seen.insert(encoded.clone()) {
            return Err(Error::UniqueViolation {
                collection: collection.to_string(),
                index: index.name.clone(),
                key: index_key.to_string(),
            });
        }
        conn.execute(
            "INSERT INTO rc_index_entries (collection, index_name, index_key, primary_key)
             VALUES (?1, ?2, ?3, ?4)",
            params![collection, index.name, encoded, primary_key],
        )?;
    }
    Ok(())
}

/// Loads every persisted collection declaration.
pub fn load_schemas(conn: &Connection) -> Result<BTreeMap<String, CollectionSchema>> {
    let has_tables: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'rc_collections'",
        [],
        |row| row.get(0),
    )?;
    let mut schemas = BTreeMap::new();
    if !has_tables {
        return Ok(schemas);
    }

    let mut stmt = conn.prepare("SELECT name, key_path, auto_increment FROM rc_collections")?;
    let collections = stmt
        .query_map([], |row| {
            Ok(CollectionSchema {
                name: row.get(0)?,
                key_path: row.get(1)?,
                auto_increment: row.get(2)?,
                indexes: Vec::new(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for collection in collections {
        schemas.insert(collection.name.clone(), collection);
    }

    let mut stmt = conn.prepare(
        "SELECT collection, name, key_paths, is_unique FROM rc_indexes ORDER BY collection, name",
    )?;
    let indexes = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for (collection, name, key_paths, unique) in indexes {
        let key_paths: Vec<String> = serde_json::from_str(&key_paths).map_err(|_| {
            Error::CorruptedData(format!("invalid key paths for index '{name}'"))
        })?;
        let schema = schemas.get_mut(&collection).ok_or_else(|| {
            Error::CorruptedData(format!("index '{name}' on missing '{collection}'"))
        })?;
        schema.indexes.push(IndexSchema {
            name,
            key_paths,
            unique,
        });
    }
    Ok(schemas)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
