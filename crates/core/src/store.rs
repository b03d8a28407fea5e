// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local structured store.
//!
//! A [`LocalStore`] holds named record collections of JSON objects, each
//! with a primary key path and optional secondary indexes. Every call runs
//! in its own transaction; [`LocalStore::run_transaction`] groups several
//! calls across collections into one atomic unit.
//!
//! ```rust,ignore
//! let mut store = LocalStore::new();
//! store.initialize(Path::new("local.db"), &config)?;
//! store.put("members", json!({"id": "m-1", "email": "ana@example.org"}))?;
//! let ana = store.get("members", &Key::from("m-1"))?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::key::{self, Key, KeyQuery};
use crate::schema::{self, CollectionSchema, StoreConfig};

/// Default time to wait on a lock held by another connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An open database and the schemas loaded from it.
struct OpenStore {
    conn: Connection,
    name: String,
    version: u32,
    schemas: BTreeMap<String, CollectionSchema>,
}

/// Local structured store over a versioned SQLite file.
pub struct LocalStore {
    inner: Option<OpenStore>,
    busy_timeout: Duration,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    /// Creates a store that must be initialized before use.
    pub fn new() -> Self {
        LocalStore {
            inner: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Sets how long an upgrade waits for other connections to release locks.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens (or creates) the database at `path` and upgrades it to `config`.
    ///
    /// Calling this on an already-open store closes the old connection first.
    pub fn initialize(&mut self, path: &Path, config: &StoreConfig) -> Result<()> {
        config.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::StorageUnavailable(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::StorageUnavailable(format!("{}: {}", path.display(), e)))?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;",
        )
        .map_err(|e| Error::StorageUnavailable(format!("{}: {}", path.display(), e)))?;

        self.attach(conn, config)
    }

    /// Opens a private in-memory database (for tests and ephemeral use).
    pub fn initialize_in_memory(&mut self, config: &StoreConfig) -> Result<()> {
        config.validate()?;
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.attach(conn, config)
    }

    fn attach(&mut self, mut conn: Connection, config: &StoreConfig) -> Result<()> {
        self.close();
        schema::upgrade(&mut conn, config)?;
        let version = schema::stored_version(&conn)?;
        let schemas = schema::load_schemas(&conn)?;
        tracing::debug!(name = %config.name, version, collections = schemas.len(), "store open");
        self.inner = Some(OpenStore {
            conn,
            name: config.name.clone(),
            version,
            schemas,
        });
        Ok(())
    }

    /// Releases the connection. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(open) = self.inner.take() {
            if let Err((_, e)) = open.conn.close() {
                tracing::warn!("error closing local store: {}", e);
            }
        }
    }

    /// Returns true between a successful `initialize` and `close`.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Name of the open database.
    pub fn name(&self) -> Result<&str> {
        Ok(&self.open()?.name)
    }

    /// Schema version of the open database.
    pub fn version(&self) -> Result<u32> {
        Ok(self.open()?.version)
    }

    /// Names of every collection in the open database.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        Ok(self.open()?.schemas.keys().cloned().collect())
    }

    fn open(&self) -> Result<&OpenStore> {
        self.inner.as_ref().ok_or(Error::NotInitialized)
    }

    /// Runs a read against one collection.
    fn read<T>(&self, collection: &str, f: impl FnOnce(Collection<'_>) -> Result<T>) -> Result<T> {
        let open = self.open()?;
        let schema = lookup_schema(&open.schemas, collection)?;
        f(Collection::new(&open.conn, schema))
    }

    /// Runs a write against one collection in its own transaction.
    fn write<T>(
        &mut self,
        collection: &str,
        f: impl FnOnce(Collection<'_>) -> Result<T>,
    ) -> Result<T> {
        let open = self.inner.as_mut().ok_or(Error::NotInitialized)?;
        let schema = lookup_schema(&open.schemas, collection)?;
        let tx = open.conn.transaction()?;
        let out = f(Collection::new(&tx, schema))?;
        tx.commit()?;
        Ok(out)
    }

    /// Inserts or replaces a record, returning its key.
    pub fn put(&mut self, collection: &str, record: Value) -> Result<Key> {
        self.write(collection, |c| c.put(record))
    }

    /// Inserts a record, failing with [`Error::DuplicateKey`] if the key exists.
    pub fn add(&mut self, collection: &str, record: Value) -> Result<Key> {
        self.write(collection, |c| c.add(record))
    }

    /// Fetches one record by primary key.
    pub fn get(&self, collection: &str, key: &Key) -> Result<Option<Value>> {
        self.read(collection, |c| c.get(key))
    }

    /// Fetches records in primary-key order, optionally restricted.
    pub fn get_all(&self, collection: &str, query: Option<KeyQuery>) -> Result<Vec<Value>> {
        self.read(collection, |c| c.get_all(query))
    }

    /// Fetches records in index-key order, optionally restricted.
    pub fn get_all_by_index(
        &self,
        collection: &str,
        index: &str,
        query: Option<KeyQuery>,
    ) -> Result<Vec<Value>> {
        self.read(collection, |c| c.get_all_by_index(index, query))
    }

    /// Deletes a record. Returns true if it existed.
    pub fn delete(&mut self, collection: &str, key: &Key) -> Result<bool> {
        self.write(collection, |c| c.delete(key))
    }

    /// Removes every record in a collection.
    pub fn clear(&mut self, collection: &str) -> Result<()> {
        self.write(collection, |c| c.clear())
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> Result<u64> {
        self.read(collection, |c| c.count())
    }

    /// Runs `work` inside one read-write transaction spanning `collections`.
    ///
    /// The transaction commits only if `work` returns `Ok`; an error or a
    /// panic rolls everything back.
    pub fn run_transaction<T, F>(&mut self, collections: &[&str], work: F) -> Result<T>
    where
        F: FnOnce(&TxScope<'_>) -> Result<T>,
    {
        let open = self.inner.as_mut().ok_or(Error::NotInitialized)?;
        for name in collections {
            lookup_schema(&open.schemas, name)?;
        }
        let tx = open.conn.transaction()?;
        let out = {
            let scope = TxScope {
                conn: &tx,
                schemas: &open.schemas,
                allowed: collections,
            };
            work(&scope)?
        };
        tx.commit()?;
        Ok(out)
    }
}

impl Drop for LocalStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn lookup_schema<'s>(
    schemas: &'s BTreeMap<String, CollectionSchema>,
    name: &str,
) -> Result<&'s CollectionSchema> {
    schemas
        .get(name)
        .ok_or_else(|| Error::UnknownCollection(name.to_string()))
}

/// Handles to the collections named when a transaction was opened.
pub struct TxScope<'t> {
    conn: &'t Connection,
    schemas: &'t BTreeMap<String, CollectionSchema>,
    allowed: &'t [&'t str],
}

impl<'t> TxScope<'t> {
    /// Returns a handle to a collection in scope.
    pub fn collection(&self, name: &str) -> Result<Collection<'t>> {
        if !self.allowed.contains(&name) {
            return Err(Error::NotInScope(name.to_string()));
        }
        let schema = lookup_schema(self.schemas, name)?;
        Ok(Collection::new(self.conn, schema))
    }
}

/// CRUD operations on one collection, bound to a connection or transaction.
///
/// Writes are not wrapped in their own transaction; callers provide one.
pub struct Collection<'c> {
    conn: &'c Connection,
    schema: &'c CollectionSchema,
}

#[derive(Clone, Copy, PartialEq)]
enum WriteMode {
    Upsert,
    InsertOnly,
}

impl<'c> Collection<'c> {
    fn new(conn: &'c Connection, schema: &'c CollectionSchema) -> Self {
        Collection { conn, schema }
    }

    /// Name of the collection.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn put(&self, record: Value) -> Result<Key> {
        self.write(record, WriteMode::Upsert)
    }

    pub fn add(&self, record: Value) -> Result<Key> {
        self.write(record, WriteMode::InsertOnly)
    }

    fn write(&self, mut record: Value, mode: WriteMode) -> Result<Key> {
        if !record.is_object() {
            return Err(Error::InvalidKey(format!(
                "records in '{}' must be JSON objects",
                self.schema.name
            )));
        }

        let primary = match key::lookup(&record, &self.schema.key_path) {
            Some(value) => Key::from_json(value)?,
            None if self.schema.auto_increment => {
                let generated = Key::Int(self.next_generated_key()?);
                key::inject(&mut record, &self.schema.key_path, &generated)?;
                generated
            }
            None => {
                return Err(Error::InvalidKey(format!(
                    "record has no value at key path '{}'",
                    self.schema.key_path
                )))
            }
        };
        if self.schema.auto_increment {
            if let Key::Int(k) = primary {
                self.bump_generator(k)?;
            }
        }

        let encoded = primary.encode();
        if mode == WriteMode::InsertOnly && self.exists(&encoded)? {
            return Err(Error::DuplicateKey {
                collection: self.schema.name.clone(),
                key: primary.to_string(),
            });
        }

        let mut entries = Vec::with_capacity(self.schema.indexes.len());
        for index in &self.schema.indexes {
            let Some(index_key) = key::extract(&record, &index.key_paths)? else {
                continue;
            };
            let index_encoded = index_key.encode();
            if index.unique && self.unique_conflict(&index.name, &index_encoded, &encoded)? {
                return Err(Error::UniqueViolation {
                    collection: self.schema.name.clone(),
                    index: index.name.clone(),
                    key: index_key.to_string(),
                });
            }
            entries.push((index.name.as_str(), index_encoded));
        }

        self.conn.execute(
            "DELETE FROM rc_index_entries WHERE collection = ?1 AND primary_key = ?2",
            params![self.schema.name, encoded],
        )?;
        self.conn.execute(
            "INSERT INTO rc_records (collection, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, key) DO UPDATE SET value = excluded.value",
            params![self.schema.name, encoded, serde_json::to_string(&record)?],
        )?;
        for (index_name, index_key) in entries {
            self.conn.execute(
                "INSERT OR IGNORE INTO rc_index_entries
                     (collection, index_name, index_key, primary_key)
                 VALUES (?1, ?2, ?3, ?4)",
                params![self.schema.name, index_name, index_key, encoded],
            )?;
        }
        Ok(primary)
    }

    fn exists(&self, encoded: &[u8]) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM rc_records WHERE collection = ?1 AND key = ?2",
                params![self.schema.name, encoded],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn unique_conflict(&self, index: &str, index_key: &[u8], primary: &[u8]) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM rc_index_entries
                 WHERE collection = ?1 AND index_name = ?2 AND index_key = ?3 AND primary_key != ?4
                 LIMIT 1",
                params![self.schema.name, index, index_key, primary],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn next_generated_key(&self) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT next_key FROM rc_collections WHERE name = ?1",
            params![self.schema.name],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    /// Keeps the key generator ahead of any explicit integer key.
    fn bump_generator(&self, used: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE rc_collections SET next_key = MAX(next_key, ?2) WHERE name = ?1",
            params![self.schema.name, used.saturating_add(1)],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &Key) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM rc_records WHERE collection = ?1 AND key = ?2",
                params![self.schema.name, key.encode()],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| serde_json::from_str(&s).map_err(Error::from))
            .transpose()
    }

    pub fn get_all(&self, query: Option<KeyQuery>) -> Result<Vec<Value>> {
        let mut bounds = Vec::new();
        let predicates = query
            .map(|q| q.into_range().sql_predicates("key", &mut bounds))
            .unwrap_or_default();
        let sql = format!(
            "SELECT value FROM rc_records WHERE collection = ?{predicates} ORDER BY key"
        );
        self.query_values(&sql, vec![], bounds)
    }

    pub fn get_all_by_index(&self, index: &str, query: Option<KeyQuery>) -> Result<Vec<Value>> {
        if self.schema.find_index(index).is_none() {
            return Err(Error::UnknownIndex {
                collection: self.schema.name.clone(),
                index: index.to_string(),
            });
        }
        let mut bounds = Vec::new();
        let predicates = query
            .map(|q| q.into_range().sql_predicates("e.index_key", &mut bounds))
            .unwrap_or_default();
        let sql = format!(
            "SELECT r.value FROM rc_index_entries e
             JOIN rc_records r ON r.collection = e.collection AND r.key = e.primary_key
             WHERE e.collection = ? AND e.index_name = ?{predicates}
             ORDER BY e.index_key, e.primary_key"
        );
        self.query_values(&sql, vec![index.to_string()], bounds)
    }

    /// Runs a value query whose first parameter is the collection name,
    /// followed by `text` parameters, then encoded key bounds.
    fn query_values(
        &self,
        sql: &str,
        text: Vec<String>,
        bounds: Vec<Vec<u8>>,
    ) -> Result<Vec<Value>> {
        use rusqlite::types::Value as SqlValue;

        let params = std::iter::once(SqlValue::Text(self.schema.name.clone()))
            .chain(text.into_iter().map(SqlValue::Text))
            .chain(bounds.into_iter().map(SqlValue::Blob));
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(Error::from))
            .collect()
    }

    pub fn delete(&self, key: &Key) -> Result<bool> {
        let encoded = key.encode();
        self.conn.execute(
            "DELETE FROM rc_index_entries WHERE collection = ?1 AND primary_key = ?2",
            params![self.schema.name, encoded],
        )?;
        let affected = self.conn.execute(
            "DELETE FROM rc_records WHERE collection = ?1 AND key = ?2",
            params![self.schema.name, encoded],
        )?;
        Ok(affected > 0)
    }

    /// Removes all records. The auto-increment generator is not reset.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM rc_index_entries WHERE collection = ?1",
            params![self.schema.name],
        )?;
        self.conn.execute(
            "DELETE FROM rc_records WHERE collection = ?1",
            params![self.schema.name],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rc_records WHERE collection = ?1",
            params![self.schema.name],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
