use std::time::Duration;

use crate::client::endpoint::Endpoint;
use crate::transport::{AttemptResult, TransportFailure};
use crate::{Error, ErrorContext};

/// Delay after a timeout, connection failure or unexpected attempt error.
const TRANSIENT_DELAY: Duration = Duration::from_secs(1);

/// What a single attempt produced, after the body of a 200 was decoded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttemptOutcome {
    Success(serde_json::Value),
    Status { status: u16, body: String },
    Timeout(String),
    Connect(String),
    Unexpected(String),
}

impl AttemptOutcome {
    pub fn from_attempt(attempt: AttemptResult) -> Self {
        match attempt {
            Ok(raw) if raw.status == 200 => match serde_json::from_str(&raw.body) {
                Ok(value) => AttemptOutcome::Success(value),
                Err(e) => AttemptOutcome::Unexpected(format!("invalid JSON body: {}", e)),
            },
            Ok(raw) => AttemptOutcome::Status {
                status: raw.status,
                body: raw.body,
            },
            Err(TransportFailure::Timeout(m)) => AttemptOutcome::Timeout(m),
            Err(TransportFailure::Connect(m)) => AttemptOutcome::Connect(m),
            Err(TransportFailure::Other(m)) => AttemptOutcome::Unexpected(m),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryReason {
    RateLimited,
    Timeout,
    Connection,
    Unexpected,
}

impl RetryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::RateLimited => "rate_limited",
            RetryReason::Timeout => "timeout",
            RetryReason::Connection => "connection",
            RetryReason::Unexpected => "unexpected",
        }
    }
}

/// Internal decision for how to proceed after an attempt.
#[derive(Debug)]
pub(crate) enum Decision {
    Complete(serde_json::Value),
    Retry { delay: Duration, reason: RetryReason },
    Fail(Error),
}

/// Retry policy shared by the blocking and async engines.
///
/// `decide` is pure: same attempt number and outcome, same decision. The
/// engines only supply the I/O and the sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Backoff after the `attempt`-th 429 (0-based): `2^attempt + 1` seconds.
    pub fn rate_limit_delay(attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_secs(factor.saturating_add(1))
    }

    /// Decide what to do after attempt number `attempt` (0-based).
    pub fn decide(&self, attempt: u32, outcome: AttemptOutcome, endpoint: Endpoint) -> Decision {
        let can_retry = attempt < self.max_retries;
        let context = || {
            ErrorContext::new()
                .with_endpoint(endpoint.path())
                .with_source("retry_engine")
        };

        match outcome {
            AttemptOutcome::Success(value) => Decision::Complete(value),

            AttemptOutcome::Status { status: 401, .. } => Decision::Fail(
                Error::authentication_with_context("Invalid API key", context().with_status_code(401)),
            ),

            AttemptOutcome::Status { status: 422, body } => {
                let detail = extract_detail(&body).unwrap_or_else(|| "Validation error".to_string());
                Decision::Fail(Error::validation_with_context(
                    detail.clone(),
                    context().with_status_code(422).with_details(detail),
                ))
            }

            AttemptOutcome::Status { status: 429, .. } => {
                if can_retry {
                    Decision::Retry {
                        delay: Self::rate_limit_delay(attempt),
                        reason: RetryReason::RateLimited,
                    }
                } else {
                    Decision::Fail(Error::rate_limited_with_context(
                        "Rate limit exceeded",
                        context().with_status_code(429),
                    ))
                }
            }

            AttemptOutcome::Status { status, body } => {
                let detail = extract_detail(&body).unwrap_or(body);
                Decision::Fail(Error::api_with_context(
                    format!("API request failed with status {}: {}", status, detail),
                    context().with_status_code(status).with_details(detail),
                ))
            }

            AttemptOutcome::Timeout(msg) => {
                transient(can_retry, RetryReason::Timeout, "Request timeout", msg, context())
            }

            AttemptOutcome::Connect(msg) => {
                transient(can_retry, RetryReason::Connection, "Connection error", msg, context())
            }

            AttemptOutcome::Unexpected(msg) => transient(
                can_retry,
                RetryReason::Unexpected,
                &format!("Unexpected error: {}", msg),
                msg,
                context(),
            ),
        }
    }
}

fn transient(
    can_retry: bool,
    reason: RetryReason,
    message: &str,
    cause: String,
    context: ErrorContext,
) -> Decision {
    if can_retry {
        Decision::Retry {
            delay: TRANSIENT_DELAY,
            reason,
        }
    } else {
        Decision::Fail(Error::api_with_context(message, context.with_details(cause)))
    }
}

/// Best-effort extraction of the `detail` field of an error body.
///
/// String details are returned as-is; structured ones (e.g. a list of field
/// errors) are rendered as compact JSON.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
