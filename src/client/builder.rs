use std::sync::Arc;
use tracing::info;

use super::core::GuardrailClient;
use crate::blocking;
use crate::config::{ClientConfig, ProtocolRevision};
use crate::transport::{BlockingHttpTransport, BlockingTransport, HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};

pub const ENV_API_KEY: &str = "XIANGXINAI_API_KEY";
pub const ENV_BASE_URL: &str = "XIANGXINAI_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "XIANGXINAI_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "XIANGXINAI_MAX_RETRIES";

/// Builder for [`GuardrailClient`] and [`blocking::GuardrailClient`].
///
/// Every setting starts at its documented default; only the API key is
/// required.
#[derive(Clone, Default)]
pub struct GuardrailClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    user_agent: Option<String>,
    protocol_revision: Option<ProtocolRevision>,
}

impl std::fmt::Debug for GuardrailClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardrailClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("protocol_revision", &self.protocol_revision)
            .finish()
    }
}

impl GuardrailClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already loaded configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            api_key: Some(config.api_key),
            base_url: Some(config.base_url),
            timeout_secs: Some(config.timeout_secs),
            max_retries: Some(config.max_retries),
            user_agent: Some(config.user_agent),
            protocol_revision: Some(config.protocol_revision),
        }
    }

    /// Read settings from `XIANGXINAI_*` environment variables.
    ///
    /// Unset variables leave the default in place. Values that do not parse
    /// are reported instead of being ignored.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            builder.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            builder.base_url = Some(url);
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            builder.timeout_secs = Some(parse_env(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Ok(raw) = std::env::var(ENV_MAX_RETRIES) {
            builder.max_retries = Some(parse_env(ENV_MAX_RETRIES, &raw)?);
        }
        Ok(builder)
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the service address (e.g. a private deployment or a mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Retries after the first attempt; `0` disables retrying.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    pub fn protocol_revision(mut self, revision: ProtocolRevision) -> Self {
        self.protocol_revision = Some(revision);
        self
    }

    /// Resolve and validate the configuration without opening a session.
    pub fn config(&self) -> Result<ClientConfig> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            Error::validation_with_context(
                "API key is required",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("client_builder"),
            )
        })?;
        let mut config = ClientConfig::new(api_key);
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(n) = self.max_retries {
            config.max_retries = n;
        }
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        if let Some(rev) = self.protocol_revision {
            config.protocol_revision = rev;
        }
        config.validated()
    }

    pub fn build(self) -> Result<GuardrailClient> {
        let config = self.config()?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::assemble(config, transport))
    }

    /// Build on a caller-supplied transport (proxies, custom TLS, tests).
    pub fn build_with_transport(self, transport: Arc<dyn Transport>) -> Result<GuardrailClient> {
        let config = self.config()?;
        Ok(Self::assemble(config, transport))
    }

    /// Build the thread-blocking variant. Must be called outside an async runtime.
    pub fn build_blocking(self) -> Result<blocking::GuardrailClient> {
        let config = self.config()?;
        let transport = Arc::new(BlockingHttpTransport::new(&config)?);
        Ok(Self::assemble_blocking(config, transport))
    }

    pub fn build_blocking_with_transport(
        self,
        transport: Arc<dyn BlockingTransport>,
    ) -> Result<blocking::GuardrailClient> {
        let config = self.config()?;
        Ok(Self::assemble_blocking(config, transport))
    }

    fn assemble(config: ClientConfig, transport: Arc<dyn Transport>) -> GuardrailClient {
        log_open(&config, "async");
        GuardrailClient::from_parts(
            transport,
            config.base_url,
            config.max_retries,
            config.protocol_revision,
        )
    }

    fn assemble_blocking(
        config: ClientConfig,
        transport: Arc<dyn BlockingTransport>,
    ) -> blocking::GuardrailClient {
        log_open(&config, "blocking");
        blocking::GuardrailClient::from_parts(
            transport,
            config.base_url,
            config.max_retries,
            config.protocol_revision,
        )
    }
}

fn log_open(config: &ClientConfig, mode: &'static str) {
    info!(
        base_url = config.base_url.as_str(),
        timeout_secs = config.timeout_secs,
        max_retries = config.max_retries,
        mode,
        "xiangxinai client opened"
    );
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        Error::validation_with_context(
            format!("Invalid value for {}: {}", name, raw),
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("client_builder"),
        )
    })
}
