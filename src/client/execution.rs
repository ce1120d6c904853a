//! 请求执行逻辑：带重试的单次逻辑请求（异步与阻塞两种挂起方式）。
//!
//! Request execution with retry. Both loops consult the same [`RetryPolicy`];
//! they differ only in how they wait (awaited I/O and `pause` vs. blocking).

use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::endpoint::Endpoint;
use super::policy::{AttemptOutcome, Decision, RetryPolicy};
use crate::transport::{BlockingTransport, HttpRequest, Transport};
use crate::Result;

fn build_request(
    endpoint: Endpoint,
    base_url: &str,
    body: Option<serde_json::Value>,
) -> HttpRequest {
    HttpRequest {
        method: endpoint.method(),
        url: endpoint.url(base_url),
        body,
    }
}

/// Execute one logical request on a cooperative transport.
pub(crate) async fn execute(
    transport: &dyn Transport,
    policy: RetryPolicy,
    base_url: &str,
    endpoint: Endpoint,
    body: Option<serde_json::Value>,
) -> Result<serde_json::Value> {
    let request = build_request(endpoint, base_url, body);
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        debug!(
            request_id = request_id.as_str(),
            endpoint = endpoint.path(),
            method = request.method.as_str(),
            attempt,
            "xiangxinai request attempt"
        );
        let outcome = AttemptOutcome::from_attempt(transport.send(&request).await);

        match policy.decide(attempt, outcome, endpoint) {
            Decision::Complete(value) => {
                debug!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    attempts = attempt + 1,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "xiangxinai request succeeded"
                );
                return Ok(value);
            }
            Decision::Retry { delay, reason } => {
                warn!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    attempt,
                    reason = reason.as_str(),
                    delay_ms = delay.as_millis() as u64,
                    "xiangxinai request will be retried"
                );
                transport.pause(delay).await;
                attempt += 1;
            }
            Decision::Fail(err) => {
                info!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    http_status = err.status_code(),
                    attempts = attempt + 1,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "xiangxinai request failed"
                );
                return Err(err);
            }
        }
    }
}

/// Execute one logical request on a blocking transport.
pub(crate) fn execute_blocking(
    transport: &dyn BlockingTransport,
    policy: RetryPolicy,
    base_url: &str,
    endpoint: Endpoint,
    body: Option<serde_json::Value>,
) -> Result<serde_json::Value> {
    let request = build_request(endpoint, base_url, body);
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        debug!(
            request_id = request_id.as_str(),
            endpoint = endpoint.path(),
            method = request.method.as_str(),
            attempt,
            "xiangxinai request attempt"
        );
        let outcome = AttemptOutcome::from_attempt(transport.send(&request));

        match policy.decide(attempt, outcome, endpoint) {
            Decision::Complete(value) => {
                debug!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    attempts = attempt + 1,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "xiangxinai request succeeded"
                );
                return Ok(value);
            }
            Decision::Retry { delay, reason } => {
                warn!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    attempt,
                    reason = reason.as_str(),
                    delay_ms = delay.as_millis() as u64,
                    "xiangxinai request will be retried"
                );
                transport.pause(delay);
                attempt += 1;
            }
            Decision::Fail(err) => {
                info!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.path(),
                    http_status = err.status_code(),
                    attempts = attempt + 1,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "xiangxinai request failed"
                );
                return Err(err);
            }
        }
    }
}
