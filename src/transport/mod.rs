//! 传输层：单次 HTTP 尝试的异步与阻塞实现。
//!
//! Transport layer. A transport performs exactly one HTTP attempt and reports
//! what happened; retry decisions live in [`crate::client::policy`].
//!
//! Both variants also own the suspension primitive used between attempts, so
//! the shared retry policy never sleeps on its own.

mod blocking;
mod http;

pub use blocking::BlockingHttpTransport;
pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One request to the guardrails API.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// Status and body text of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Why an attempt produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportFailure::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportFailure::Connect(e.to_string())
        } else {
            TransportFailure::Other(e.to_string())
        }
    }
}

pub type AttemptResult = std::result::Result<RawResponse, TransportFailure>;

/// Cooperative transport used by [`GuardrailClient`](crate::GuardrailClient).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single attempt.
    async fn send(&self, request: &HttpRequest) -> AttemptResult;

    /// Download a remote image. Not retried.
    async fn fetch(&self, url: &str) -> Result<Bytes>;

    /// Suspend between attempts.
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Thread-blocking transport used by [`blocking::GuardrailClient`](crate::blocking::GuardrailClient).
pub trait BlockingTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> AttemptResult;

    fn fetch(&self, url: &str) -> Result<Bytes>;

    fn pause(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// The caller names the image; only the cause is kept here.
fn fetch_error(e: reqwest::Error) -> crate::Error {
    let e = e.without_url();
    crate::Error::api_with_source(
        e.to_string(),
        crate::ErrorContext::new().with_source("media_fetch"),
        e,
    )
}
