use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

use super::{fetch_error, AttemptResult, HttpRequest, Method, RawResponse, Transport};
use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};

/// Async transport over a pooled `reqwest::Client`.
///
/// The bearer credential is attached per API request rather than as a default
/// header, so image downloads from third-party hosts never carry it.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
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

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> AttemptResult {
        let mut req = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        req = req.bearer_auth(&self.api_key).headers(Self::json_headers());
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        resp.bytes().await.map_err(fetch_error)
    }
}
