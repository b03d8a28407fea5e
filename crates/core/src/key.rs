// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record keys, key paths and key ranges.
//!
//! Keys are persisted as order-preserving byte strings so that SQLite's
//! `memcmp` comparison of BLOB columns matches [`Key`]'s `Ord`:
//!
//! ```text
//! Int    0x10 | i64 big-endian with the sign bit flipped
//! Text   0x20 | utf-8 bytes, 0x00 escaped as 0x00 0xFF | 0x00 0x00
//! Array  0x30 | encoded elements                        | 0x00
//! ```

use std::fmt;
use std::ops::Bound;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

const TAG_INT: u8 = 0x10;
const TAG_TEXT: u8 = 0x20;
const TAG_ARRAY: u8 = 0x30;
const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0xFF;

/// A primary or index key.
///
/// Variant order is significant: integers sort before strings, strings
/// before arrays.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Text(String),
    Array(Vec<Key>),
}

impl Key {
    /// Converts a JSON value into a key.
    ///
    /// Numbers must be integers; `1.5` and other fractional values are rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Key::Int)
                .ok_or_else(|| Error::InvalidKey(format!("{n} is not an integer"))),
            Value::String(s) => Ok(Key::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Key::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Key::Array),
            other => Err(Error::InvalidKey(format!("{other} cannot be used as a key"))),
        }
    }

    /// Converts the key back into its JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            Key::Int(i) => Value::from(*i),
            Key::Text(s) => Value::String(s.clone()),
            Key::Array(items) => Value::Array(items.iter().map(Key::to_json).collect()),
        }
    }

    /// Encodes the key into its order-preserving byte form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Key::Int(i) => {
                out.push(TAG_INT);
                out.extend_from_slice(&((*i as u64) ^ (1 << 63)).to_be_bytes());
            }
            Key::Text(s) => {
                out.push(TAG_TEXT);
                for &b in s.as_bytes() {
                    out.push(b);
                    if b == TERMINATOR {
                        out.push(ESCAPE);
                    }
                }
                out.extend_from_slice(&[TERMINATOR, TERMINATOR]);
            }
            Key::Array(items) => {
                out.push(TAG_ARRAY);
                for item in items {
                    item.encode_into(out);
                }
                out.push(TERMINATOR);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<Vec<Key>> for Key {
    fn from(items: Vec<Key>) -> Self {
        Key::Array(items)
    }
}

/// Looks up a dotted key path (`"a.b.c"`) inside a JSON value.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Writes `key` at a dotted key path, creating intermediate objects.
pub fn inject(value: &mut Value, path: &str, key: &Key) -> Result<()> {
    let mut segments = path.split('.').peekable();
    let mut current = value;
    while let Some(segment) = segments.next() {
        let map = current.as_object_mut().ok_or_else(|| {
            Error::InvalidKey(format!("cannot set key path '{path}' on non-object"))
        })?;
        if segments.peek().is_none() {
            map.insert(segment.to_string(), key.to_json());
            return Ok(());
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}

/// Extracts the key for a list of key paths.
///
/// A single path yields the value at that path; several paths yield an
/// array key. Returns `Ok(None)` when any path is missing.
pub fn extract(value: &Value, paths: &[String]) -> Result<Option<Key>> {
    match paths {
        [single] => lookup(value, single).map(Key::from_json).transpose(),
        _ => {
            let mut parts = Vec::with_capacity(paths.len());
            for path in paths {
                match lookup(value, path) {
                    Some(v) => parts.push(Key::from_json(v)?),
                    None => return Ok(None),
                }
            }
            Ok(Some(Key::Array(parts)))
        }
    }
}

/// A contiguous range of keys.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRange {
    pub lower: Bound<Key>,
    pub upper: Bound<Key>,
}

impl KeyRange {
    /// Matches exactly one key.
    pub fn only(key: impl Into<Key>) -> Self {
        let key = key.into();
        KeyRange {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// Matches keys above `key`.
    pub fn lower_bound(key: impl Into<Key>, open: bool) -> Self {
        KeyRange {
            lower: bound(key.into(), open),
            upper: Bound::Unbounded,
        }
    }

    /// Matches keys below `key`.
    pub fn upper_bound(key: impl Into<Key>, open: bool) -> Self {
        KeyRange {
            lower: Bound::Unbounded,
            upper: bound(key.into(), open),
        }
    }

    /// Matches keys between `lower` and `upper`.
    pub fn bound(
        lower: impl Into<Key>,
        upper: impl Into<Key>,
        lower_open: bool,
        upper_open: bool,
    ) -> Self {
        KeyRange {
            lower: bound(lower.into(), lower_open),
            upper: bound(upper.into(), upper_open),
        }
    }

    /// Returns true if `key` falls inside the range.
    pub fn contains(&self, key: &Key) -> bool {
        let above = match &self.lower {
            Bound::Included(lo) => key >= lo,
            Bound::Excluded(lo) => key > lo,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(hi) => key <= hi,
            Bound::Excluded(hi) => key < hi,
            Bound::Unbounded => true,
        };
        above && below
    }

    /// Renders SQL predicates over an encoded key column, pushing the
    /// encoded bounds onto `params`.
    pub(crate) fn sql_predicates(&self, column: &str, params: &mut Vec<Vec<u8>>) -> String {
        let mut sql = String::new();
        match &self.lower {
            Bound::Included(k) => {
                sql.push_str(&format!(" AND {column} >= ?"));
                params.push(k.encode());
            }
            Bound::Excluded(k) => {
                sql.push_str(&format!(" AND {column} > ?"));
                params.push(k.encode());
            }
            Bound::Unbounded => {}
        }
        match &self.upper {
            Bound::Included(k) => {
                sql.push_str(&format!(" AND {column} <= ?"));
                params.push(k.encode());
            }
            Bound::Excluded(k) => {
                sql.push_str(&format!(" AND {column} < ?"));
                params.push(k.encode());
            }
            Bound::Unbounded => {}
        }
        sql
    }
}

fn bound(key: Key, open: bool) -> Bound<Key> {
    if open {
        Bound::Excluded(key)
    } else {
        Bound::Included(key)
    }
}

/// Either a single key or a key range, accepted by query operations.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyQuery {
    Key(Key),
    Range(KeyRange),
}

impl KeyQuery {
    /// Normalizes the query into a range.
    pub fn into_range(self) -> KeyRange {
        match self {
            KeyQuery::Key(k) => KeyRange::only(k),
            KeyQuery::Range(r) => r,
        }
    }
}

impl From<Key> for KeyQuery {
    fn from(key: Key) -> Self {
        KeyQuery::Key(key)
    }
}

impl From<KeyRange> for KeyQuery {
    fn from(range: KeyRange) -> Self {
        KeyQuery::Range(range)
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
