//! 阻塞式客户端：与异步客户端相同的操作，在调用线程上同步执行。
//!
//! Thread-blocking client. Same operations and semantics as the async
//! [`GuardrailClient`](crate::GuardrailClient); the calling thread is occupied
//! for the whole call, retry sleeps included.
//!
//! Build it with [`GuardrailClientBuilder::build_blocking`](crate::GuardrailClientBuilder::build_blocking)
//! outside of any async runtime.

use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::client::core::short_circuit;
use crate::client::execution::execute_blocking;
use crate::client::policy::RetryPolicy;
use crate::client::response::classify;
use crate::client::{closed_error, CheckOptions, Endpoint, GuardrailClientBuilder};
use crate::config::ProtocolRevision;
use crate::media;
use crate::payload::{check_image_references, PayloadBuilder, Prepared};
use crate::transport::BlockingTransport;
use crate::types::{GuardrailRequest, GuardrailResponse, Message};
use crate::Result;

struct Session {
    transport: Arc<dyn BlockingTransport>,
}

pub struct GuardrailClient {
    session: ArcSwapOption<Session>,
    policy: RetryPolicy,
    base_url: String,
    revision: ProtocolRevision,
    payloads: PayloadBuilder,
}

impl fmt::Debug for GuardrailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("blocking::GuardrailClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.policy.max_retries)
            .field("protocol_revision", &self.revision)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl GuardrailClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        GuardrailClientBuilder::new().api_key(api_key).build_blocking()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn BlockingTransport>,
        base_url: String,
        max_retries: u32,
        revision: ProtocolRevision,
    ) -> Self {
        Self {
            session: ArcSwapOption::from_pointee(Session { transport }),
            policy: RetryPolicy::new(max_retries),
            base_url,
            revision,
            payloads: PayloadBuilder::new(revision),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn check_prompt(&self, content: &str, user_id: Option<&str>) -> Result<GuardrailResponse> {
        match self.payloads.prompt(content, user_id) {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Input)),
            Prepared::Send(body) => self.detect(Endpoint::Input, &body),
        }
    }

    pub fn check_response_ctx(
        &self,
        prompt: &str,
        response: &str,
        user_id: Option<&str>,
    ) -> Result<GuardrailResponse> {
        match self.payloads.response_pair(prompt, response, user_id) {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Output)),
            Prepared::Send(body) => self.detect(Endpoint::Output, &body),
        }
    }

    pub fn check_conversation(
        &self,
        messages: &[Message],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        let prepared = self.payloads.conversation(
            messages,
            options.text_model(),
            options.user_id.as_deref(),
        )?;
        self.detect_prepared(prepared)
    }

    pub fn check_conversation_json(
        &self,
        messages: &[serde_json::Value],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        let prepared = self.payloads.conversation_json(
            messages,
            options.text_model(),
            options.user_id.as_deref(),
        )?;
        self.detect_prepared(prepared)
    }

    pub fn check_prompt_image(
        &self,
        prompt: &str,
        image: &str,
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        self.check_prompt_images(prompt, &[image], options)
    }

    pub fn check_prompt_images<S: AsRef<str>>(
        &self,
        prompt: &str,
        images: &[S],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        check_image_references(images)?;
        let session = self.session()?;
        let uris = media::resolve_all_blocking(session.transport.as_ref(), images)?;
        let request = self.payloads.image_message(
            prompt,
            uris,
            options.vision_model(),
            options.user_id.as_deref(),
        )?;
        self.detect(Endpoint::Guardrails, &request)
    }

    pub fn health_check(&self) -> Result<serde_json::Value> {
        self.fetch_raw(Endpoint::Health)
    }

    pub fn get_models(&self) -> Result<serde_json::Value> {
        self.fetch_raw(Endpoint::Models)
    }

    /// Release the connection pool. Closing twice is a no-op.
    pub fn close(&self) {
        if self.session.swap(None).is_some() {
            info!(base_url = self.base_url.as_str(), "xiangxinai client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.session.load().is_none()
    }

    fn session(&self) -> Result<Arc<Session>> {
        self.session.load_full().ok_or_else(closed_error)
    }

    fn detect_prepared(
        &self,
        prepared: Prepared<GuardrailRequest>,
    ) -> Result<GuardrailResponse> {
        match prepared {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Guardrails)),
            Prepared::Send(request) => self.detect(Endpoint::Guardrails, &request),
        }
    }

    fn detect<B: Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<GuardrailResponse> {
        let session = self.session()?;
        let body = serde_json::to_value(body)?;
        let value = execute_blocking(
            session.transport.as_ref(),
            self.policy,
            &self.base_url,
            endpoint,
            Some(body),
        )?;
        classify(endpoint, value, self.revision)?.into_guardrail()
    }

    fn fetch_raw(&self, endpoint: Endpoint) -> Result<serde_json::Value> {
        let session = self.session()?;
        let value = execute_blocking(
            session.transport.as_ref(),
            self.policy,
            &self.base_url,
            endpoint,
            None,
        )?;
        Ok(classify(endpoint, value, self.revision)?.into_raw())
    }
}
