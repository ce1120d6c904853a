//! Response classification: typed detection results vs. untyped service payloads.

use super::endpoint::Endpoint;
use crate::config::ProtocolRevision;
use crate::types::GuardrailResponse;
use crate::{Error, ErrorContext, Result};

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Result of a detection endpoint.
    Guardrail(GuardrailResponse),
    /// Health and model listing payloads, passed through unchanged.
    Raw(serde_json::Value),
}

impl ApiResponse {
    pub fn into_guardrail(self) -> Result<GuardrailResponse> {
        match self {
            ApiResponse::Guardrail(resp) => Ok(resp),
            ApiResponse::Raw(_) => Err(Error::api_with_context(
                "Expected a guardrail detection result",
                ErrorContext::new().with_source("response_classifier"),
            )),
        }
    }

    pub fn into_raw(self) -> serde_json::Value {
        match self {
            ApiResponse::Raw(value) => value,
            ApiResponse::Guardrail(resp) => {
                serde_json::to_value(resp).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// Decide the shape of a successful body from the endpoint that produced it.
pub(crate) fn classify(
    endpoint: Endpoint,
    body: serde_json::Value,
    revision: ProtocolRevision,
) -> Result<ApiResponse> {
    if !endpoint.is_detection() {
        return Ok(ApiResponse::Raw(body));
    }
    GuardrailResponse::from_value(body, revision)
        .map(ApiResponse::Guardrail)
        .map_err(|e| match e {
            Error::Api {
                message,
                context,
                source,
            } => Error::Api {
                message,
                context: context.with_endpoint(endpoint.path()),
                source,
            },
            other => other,
        })
}
