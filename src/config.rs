//! Client configuration: credential, base address, timeout, retry budget and
//! protocol revision.
//!
//! A [`ClientConfig`] is usually assembled through
//! [`GuardrailClientBuilder`](crate::GuardrailClientBuilder), but can also be
//! loaded from YAML:
//!
//! ```yaml
//! api_key: your-api-key
//! base_url: https://api.xiangxinai.cn/v1
//! timeout_secs: 30
//! max_retries: 3
//! protocol_revision: current
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::{Error, ErrorContext, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.xiangxinai.cn/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Model used by conversation checks unless the caller picks another.
pub const DEFAULT_TEXT_MODEL: &str = "Xiangxin-Guardrails-Text";
/// Model used by image checks unless the caller picks another.
pub const DEFAULT_VISION_MODEL: &str = "Xiangxin-Guardrails-VL";

pub fn default_user_agent() -> String {
    format!("xiangxinai-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Revision of the wire protocol spoken by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolRevision {
    /// English enumerations, optional confidence `score`, 1,000,000 character limit.
    #[default]
    Current,
    /// Localized enumerations, no `score`, 10,000 character limit.
    Legacy,
}

impl ProtocolRevision {
    /// Maximum message content length in characters.
    pub fn max_content_chars(&self) -> usize {
        match self {
            Self::Current => 1_000_000,
            Self::Legacy => 10_000,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub protocol_revision: ProtocolRevision,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("protocol_revision", &self.protocol_revision)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: default_user_agent(),
            protocol_revision: ProtocolRevision::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: ClientConfig = serde_yaml::from_str(yaml).map_err(|e| {
            Error::validation_with_context(
                format!("Invalid client configuration: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })?;
        cfg.validated()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::validation_with_context(
                format!("Cannot read configuration file: {}", path.display()),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the configuration and normalize the base URL (no trailing slash).
    pub fn validated(mut self) -> Result<Self> {
        if self.api_key.trim().is_empty() {
            return Err(Error::validation_with_context(
                "API key must not be empty",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("config_validator"),
            ));
        }

        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&trimmed).map_err(|e| {
            Error::validation_with_context(
                format!("Invalid base URL: {}", trimmed),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("config_validator"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::validation_with_context(
                format!("Base URL must use http or https: {}", trimmed),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("config_validator"),
            ));
        }
        self.base_url = trimmed;

        if self.timeout_secs == 0 {
            return Err(Error::validation_with_context(
                "timeout_secs must be greater than zero",
                ErrorContext::new()
                    .with_field_path("timeout_secs")
                    .with_source("config_validator"),
            ));
        }

        Ok(self)
    }
}
