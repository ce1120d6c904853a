use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;

use super::{fetch_error, AttemptResult, BlockingTransport, HttpRequest, Method, RawResponse};
use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};

/// Thread-blocking transport over `reqwest::blocking::Client`.
///
/// Must not be created or dropped from inside an async runtime.
pub struct BlockingHttpTransport {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl BlockingHttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| {
                Error::api_with_source(
                    "Failed to create HTTP client",
                    ErrorContext::new().with_source("transport"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn send(&self, request: &HttpRequest) -> AttemptResult {
        let mut req = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        req = req
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(RawResponse { status, body })
    }

    fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        resp.bytes().map_err(fetch_error)
    }
}
