//! 图片编码：本地文件与远程地址统一转为 base64 data URI。
//!
//! Image encoding. Every image reference, local path or HTTP(S) address, is
//! turned into a `data:image/jpeg;base64,...` URI before it goes on the wire.
//! The media type label is fixed regardless of the actual format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::transport::{BlockingTransport, Transport};
use crate::{Error, ErrorContext, Result};

pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Local(PathBuf),
    Remote(String),
}

impl ImageReference {
    /// References starting with `http://` or `https://` are remote; anything
    /// else is a filesystem path.
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            ImageReference::Remote(reference.to_string())
        } else {
            ImageReference::Local(PathBuf::from(reference))
        }
    }
}

pub fn encode_data_uri(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(DATA_URI_PREFIX.len() + bytes.len() * 4 / 3 + 4);
    out.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(bytes, &mut out);
    out
}

/// Inverse of [`encode_data_uri`]. Only URIs carrying our prefix are accepted.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX).ok_or_else(|| {
        Error::validation_with_context(
            "Not a base64 JPEG data URI",
            ErrorContext::new().with_source("media_encoder"),
        )
    })?;
    STANDARD.decode(payload).map_err(|e| {
        Error::validation_with_context(
            "Invalid base64 payload in data URI",
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("media_encoder"),
        )
    })
}

/// Resolve one reference to a data URI on a cooperative transport.
pub async fn resolve(transport: &dyn Transport, reference: &str) -> Result<String> {
    let bytes = match ImageReference::parse(reference) {
        ImageReference::Local(path) => {
            let read = tokio::fs::read(&path).await;
            read.map_err(|e| local_read_error(&path, e))?
        }
        ImageReference::Remote(url) => transport
            .fetch(&url)
            .await
            .map_err(|e| remote_error(&url, e))?
            .to_vec(),
    };
    debug!(reference, size = bytes.len(), "image encoded");
    Ok(encode_data_uri(&bytes))
}

/// Resolve references in order, stopping at the first failure.
pub async fn resolve_all<S: AsRef<str>>(
    transport: &dyn Transport,
    references: &[S],
) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(references.len());
    for reference in references {
        out.push(resolve(transport, reference.as_ref()).await?);
    }
    Ok(out)
}

/// Resolve one reference to a data URI on a blocking transport.
pub fn resolve_blocking(transport: &dyn BlockingTransport, reference: &str) -> Result<String> {
    let bytes = match ImageReference::parse(reference) {
        ImageReference::Local(path) => {
            std::fs::read(&path).map_err(|e| local_read_error(&path, e))?
        }
        ImageReference::Remote(url) => transport
            .fetch(&url)
            .map_err(|e| remote_error(&url, e))?
            .to_vec(),
    };
    debug!(reference, size = bytes.len(), "image encoded");
    Ok(encode_data_uri(&bytes))
}

pub fn resolve_all_blocking<S: AsRef<str>>(
    transport: &dyn BlockingTransport,
    references: &[S],
) -> Result<Vec<String>> {
    references
        .iter()
        .map(|r| resolve_blocking(transport, r.as_ref()))
        .collect()
}

fn local_read_error(path: &Path, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::validation_with_context(
            format!("Image file not found: {}", path.display()),
            ErrorContext::new()
                .with_field_path("image")
                .with_source("media_encoder"),
        )
    } else {
        Error::api_with_source(
            format!("Failed to encode image {}: {}", path.display(), e),
            ErrorContext::new().with_source("media_encoder"),
            e,
        )
    }
}

fn remote_error(url: &str, e: Error) -> Error {
    Error::api_with_source(
        format!("Failed to encode image {}: {}", url, e.message()),
        e.context().clone().with_source("media_encoder"),
        e,
    )
}
