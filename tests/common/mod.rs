//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use xiangxinai::transport::{
    AttemptResult, BlockingTransport, HttpRequest, RawResponse, Transport, TransportFailure,
};
use xiangxinai::Error;

pub const API_KEY: &str = "test-key";

/// Body of a blocked detection result on the current protocol revision.
pub fn blocked_body() -> Value {
    json!({
        "id": "guardrails-7f3a",
        "result": {
            "compliance": {"risk_level": "high_risk", "categories": ["Violent Crime"]},
            "security": {"risk_level": "no_risk", "categories": []},
            "data": {"risk_level": "no_risk", "categories": []}
        },
        "overall_risk_level": "high_risk",
        "suggest_action": "reject",
        "suggest_answer": "Sorry, I can't help with that.",
        "score": 0.97
    })
}

pub fn safe_body() -> Value {
    json!({
        "id": "guardrails-0001",
        "result": {
            "compliance": {"risk_level": "no_risk", "categories": []},
            "security": {"risk_level": "no_risk", "categories": []}
        },
        "overall_risk_level": "no_risk",
        "suggest_action": "pass",
        "suggest_answer": null
    })
}

pub fn legacy_body() -> Value {
    json!({
        "id": "guardrails-legacy",
        "result": {
            "compliance": {"risk_level": "中风险", "categories": ["违法犯罪"]},
            "security": {"risk_level": "无风险", "categories": []}
        },
        "overall_risk_level": "中风险",
        "suggest_action": "代答",
        "suggest_answer": "这个问题我无法回答。"
    })
}

pub fn ok(body: &Value) -> AttemptResult {
    Ok(RawResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16, body: &str) -> AttemptResult {
    Ok(RawResponse {
        status: code,
        body: body.to_string(),
    })
}

pub fn timeout() -> AttemptResult {
    Err(TransportFailure::Timeout("operation timed out".into()))
}

/// In-memory transport replaying scripted attempt results.
///
/// Records every request, every pause and every image fetch so tests can
/// assert on the exact I/O a call performed.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<AttemptResult>>,
    images: HashMap<String, std::result::Result<Vec<u8>, String>>,
    pub sent: Mutex<Vec<HttpRequest>>,
    pub pauses: Mutex<Vec<Duration>>,
    pub fetched: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<AttemptResult>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), Ok(bytes.to_vec()));
        self
    }

    pub fn with_broken_image(mut self, url: &str, reason: &str) -> Self {
        self.images.insert(url.to_string(), Err(reason.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn reply(&self, request: &HttpRequest) -> AttemptResult {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left")
    }

    fn image(&self, url: &str) -> xiangxinai::Result<Bytes> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.images.get(url) {
            Some(Ok(bytes)) => Ok(Bytes::from(bytes.clone())),
            Some(Err(reason)) => Err(Error::api(reason.clone())),
            None => Err(Error::api("HTTP status client error (404 Not Found)")),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> AttemptResult {
        self.reply(request)
    }

    async fn fetch(&self, url: &str) -> xiangxinai::Result<Bytes> {
        self.image(url)
    }

    async fn pause(&self, delay: Duration) {
        self.pauses.lock().unwrap().push(delay);
    }
}

impl BlockingTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> AttemptResult {
        self.reply(request)
    }

    fn fetch(&self, url: &str) -> xiangxinai::Result<Bytes> {
        self.image(url)
    }

    fn pause(&self, delay: Duration) {
        self.pauses.lock().unwrap().push(delay);
    }
}
