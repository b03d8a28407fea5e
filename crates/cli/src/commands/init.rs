// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rollcall_core::LocalStore;

use crate::config::{get_db_path, init_work_dir, ApiConfig, Config};
use crate::error::{Error, Result};

pub fn run(api: Option<String>, token: Option<String>) -> Result<()> {
    let config = build_config(api, token)?;
    let target_path = std::env::current_dir()?;
    let work_dir = init_work_dir(&target_path, &config)?;

    // Create the database and the offline queue collection up front.
    let db_path = get_db_path(&work_dir, &config);
    let mut store = LocalStore::new();
    store.initialize(&db_path, &config.store_config())?;
    store.close();

    println!("Initialized rollcall at {}", work_dir.display());
    match &config.api {
        Some(api) => println!("API: {}", api.base_url),
        None => println!(
            "No API configured; operations will stay staged until [api] base_url is set"
        ),
    }
    Ok(())
}

fn build_config(api: Option<String>, token: Option<String>) -> Result<Config> {
    let mut config = Config::default();
    match (api, token) {
        (Some(url), token) => {
            let mut api = ApiConfig::new(url);
            api.token = token;
            config.api = Some(api);
        }
        (None, Some(_)) => {
            return Err(Error::InvalidInput("--token requires --api".to_string()));
        }
        (None, None) => {}
    }
    Ok(config)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
