// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first outbox and background sync for the rollcall registration API")]
#[command(
    long_about = "Offline-first outbox and background sync for the rollcall registration API.\n\n\
    Operations are staged in a local store and delivered to the REST API with bounded retries."
)]
pub struct Cli {
    /// Run as if rollcall was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize rollcall in the current directory
    #[command(after_help = "\
Examples:
  rollcall init                                   Local store only
  rollcall init --api https://api.example.com     Store plus remote API
  rollcall init --api http://localhost:8080 --token dev")]
    Init {
        /// Base URL of the REST API
        #[arg(long, value_name = "URL")]
        api: Option<String>,

        /// Bearer token sent with every request (requires --api)
        #[arg(long)]
        token: Option<String>,
    },

    /// Stage an operation for delivery
    #[command(after_help = "\
Examples:
  rollcall enqueue POST /members --payload '{\"name\":\"Ana\"}'
  rollcall enqueue PUT /events/5 --payload '{\"title\":\"Retreat\"}' --id op2
  rollcall enqueue DELETE /centers/2")]
    Enqueue {
        /// HTTP method (GET, POST, PUT, DELETE, PATCH)
        method: String,

        /// Endpoint, relative to the API base URL or absolute
        #[arg(value_parser = non_empty_string)]
        endpoint: String,

        /// JSON request body
        #[arg(long, short)]
        payload: Option<String>,

        /// Operation id (generated when omitted)
        #[arg(long, value_parser = non_empty_string)]
        id: Option<String>,
    },

    /// List staged operations
    Queue {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Deliver staged operations to the API
    Sync {
        /// Run a single pass instead of retrying until nothing is pending
        #[arg(long)]
        once: bool,
    },

    /// Discard every staged operation
    Clear,
}
