// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rollcall_core::Method;
use sha2::{Digest, Sha256};

/// Generate an operation ID from the request it describes and the time it was made.
/// Format: op-{hash} where hash is first 8 hex chars of SHA256(method + endpoint + timestamp)
pub fn generate_id(method: Method, endpoint: &str, created_at: &DateTime<Utc>) -> String {
    let input = format!("{}{}{}", method, endpoint, created_at.to_rfc3339());
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]); // First 8 hex chars (4 bytes)
    format!("op-{}", short_hash)
}

/// Generate a unique ID, handling collisions by appending incrementing suffix.
pub fn generate_unique_id<F>(
    method: Method,
    endpoint: &str,
    created_at: &DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(method, endpoint, created_at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
