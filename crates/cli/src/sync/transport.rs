// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for delivering queued operations.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP delivery for production
//! - Scripted transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use rollcall_core::{Method, QueuedOperation};

use crate::config::ApiConfig;

/// Error type for transport operations.
///
/// Only failures that produced no HTTP response are errors; any status code
/// the server returns is a successful delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL or endpoint could not be turned into a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Connection failed or was dropped before a response arrived.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the request timeout.
    #[error("request timed out")]
    TimedOut,
}

impl TransportError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::InvalidUrl(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport::deliver`].
pub type DeliverFuture<'a> = Pin<Box<dyn Future<Output = TransportResult<u16>> + Send + 'a>>;

/// Transport trait for delivering one operation to the remote API.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Performs the request described by `op` and returns the HTTP status.
    fn deliver<'a>(&'a self, op: &'a QueuedOperation) -> DeliverFuture<'a>;
}

/// How a delivery attempt is treated by the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx: the operation is done.
    Delivered,
    /// 5xx or 429: worth another attempt.
    Transient,
    /// Any other status: retrying will not help.
    Rejected,
}

/// Classifies an HTTP status code.
pub fn classify(status: u16) -> Outcome {
    match status {
        200..=299 => Outcome::Delivered,
        429 | 500..=599 => Outcome::Transient,
        _ => Outcome::Rejected,
    }
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport from API settings.
    pub fn new(api: &ApiConfig) -> TransportResult<Self> {
        let base_url = Url::parse(&api.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", api.base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout())
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(HttpTransport {
            http,
            base_url,
            token: api.token.clone(),
        })
    }

    /// Create a transport against `base_url` with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> TransportResult<Self> {
        let mut api = ApiConfig::new(base_url);
        api.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        Self::new(&api)
    }

    /// Absolute endpoints are used verbatim, anything else is joined onto the base URL.
    fn url(&self, endpoint: &str) -> TransportResult<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Url::parse(endpoint)
                .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", endpoint, e)));
        }
        self.base_url
            .join(endpoint)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }

    fn request(&self, op: &QueuedOperation) -> TransportResult<reqwest::RequestBuilder> {
        let url = self.url(&op.endpoint)?;
        let method = match op.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        };
        let mut req = self.http.request(method, url);
        if let Some(payload) = &op.payload {
            req = req.header(CONTENT_TYPE, "application/json").json(payload);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }
}

impl Transport for HttpTransport {
    fn deliver<'a>(&'a self, op: &'a QueuedOperation) -> DeliverFuture<'a> {
        Box::pin(async move {
            let req = self.request(op)?;
            let response = req.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::TimedOut
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;
            Ok(response.status().as_u16())
        })
    }
}
