use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::builder::GuardrailClientBuilder;
use super::endpoint::Endpoint;
use super::execution::execute;
use super::options::CheckOptions;
use super::policy::RetryPolicy;
use super::response::classify;
use crate::config::ProtocolRevision;
use crate::media;
use crate::payload::{check_image_references, PayloadBuilder, Prepared};
use crate::transport::Transport;
use crate::types::{GuardrailResponse, Message};
use crate::Result;

/// Open transport session of an async client.
pub(crate) struct Session {
    pub(crate) transport: Arc<dyn Transport>,
}

/// Async client for the guardrails service.
///
/// Holds one connection pool for its whole life. The pool is released on
/// [`close`](Self::close) or when the client is dropped; calls made after an
/// explicit close fail, while calls already in flight finish on the pool they
/// started with.
///
/// ```no_run
/// # async fn demo() -> xiangxinai::Result<()> {
/// let client = xiangxinai::GuardrailClient::new("your-api-key")?;
/// let result = client.check_prompt("How do I pick a lock?", None).await?;
/// if result.is_blocked() {
///     println!("blocked: {:?}", result.suggest_answer);
/// }
/// # Ok(())
/// # }
/// ```
pub struct GuardrailClient {
    session: ArcSwapOption<Session>,
    policy: RetryPolicy,
    base_url: String,
    revision: ProtocolRevision,
    payloads: PayloadBuilder,
}

impl fmt::Debug for GuardrailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardrailClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.policy.max_retries)
            .field("protocol_revision", &self.revision)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl GuardrailClient {
    /// Client with default settings for the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        GuardrailClientBuilder::new().api_key(api_key).build()
    }

    pub fn builder() -> GuardrailClientBuilder {
        GuardrailClientBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
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

    pub fn protocol_revision(&self) -> ProtocolRevision {
        self.revision
    }

    /// Check a single user input.
    ///
    /// Blank input yields the safe default without a network call.
    pub async fn check_prompt(
        &self,
        content: &str,
        user_id: Option<&str>,
    ) -> Result<GuardrailResponse> {
        match self.payloads.prompt(content, user_id) {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Input)),
            Prepared::Send(body) => self.detect(Endpoint::Input, &body).await,
        }
    }

    /// Check a model answer in the context of the prompt that produced it.
    pub async fn check_response_ctx(
        &self,
        prompt: &str,
        response: &str,
        user_id: Option<&str>,
    ) -> Result<GuardrailResponse> {
        match self.payloads.response_pair(prompt, response, user_id) {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Output)),
            Prepared::Send(body) => self.detect(Endpoint::Output, &body).await,
        }
    }

    /// Context-aware check of a whole conversation.
    pub async fn check_conversation(
        &self,
        messages: &[Message],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        let prepared = self.payloads.conversation(
            messages,
            options.text_model(),
            options.user_id.as_deref(),
        )?;
        self.detect_prepared(prepared).await
    }

    /// Same as [`check_conversation`](Self::check_conversation) for entries
    /// given as JSON objects with `role` and `content`.
    pub async fn check_conversation_json(
        &self,
        messages: &[serde_json::Value],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        let prepared = self.payloads.conversation_json(
            messages,
            options.text_model(),
            options.user_id.as_deref(),
        )?;
        self.detect_prepared(prepared).await
    }

    /// Check one image, local path or HTTP(S) address, with an optional prompt.
    pub async fn check_prompt_image(
        &self,
        prompt: &str,
        image: &str,
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        self.check_prompt_images(prompt, &[image], options).await
    }

    /// Check several images in one request. Images keep their input order.
    pub async fn check_prompt_images<S: AsRef<str>>(
        &self,
        prompt: &str,
        images: &[S],
        options: &CheckOptions,
    ) -> Result<GuardrailResponse> {
        check_image_references(images)?;
        let session = self.session()?;
        let uris = media::resolve_all(session.transport.as_ref(), images).await?;
        let request = self.payloads.image_message(
            prompt,
            uris,
            options.vision_model(),
            options.user_id.as_deref(),
        )?;
        self.detect(Endpoint::Guardrails, &request).await
    }

    /// Service health payload, undecoded.
    pub async fn health_check(&self) -> Result<serde_json::Value> {
        self.fetch_raw(Endpoint::Health).await
    }

    /// Available models, undecoded.
    pub async fn get_models(&self) -> Result<serde_json::Value> {
        self.fetch_raw(Endpoint::Models).await
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
        self.session.load_full().ok_or_else(super::closed_error)
    }

    async fn detect_prepared(
        &self,
        prepared: Prepared<crate::types::GuardrailRequest>,
    ) -> Result<GuardrailResponse> {
        match prepared {
            Prepared::SafeDefault => Ok(short_circuit(Endpoint::Guardrails)),
            Prepared::Send(request) => self.detect(Endpoint::Guardrails, &request).await,
        }
    }

    async fn detect<B: Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<GuardrailResponse> {
        let session = self.session()?;
        let body = serde_json::to_value(body)?;
        let value = execute(
            session.transport.as_ref(),
            self.policy,
            &self.base_url,
            endpoint,
            Some(body),
        )
        .await?;
        classify(endpoint, value, self.revision)?.into_guardrail()
    }

    async fn fetch_raw(&self, endpoint: Endpoint) -> Result<serde_json::Value> {
        let session = self.session()?;
        let value = execute(
            session.transport.as_ref(),
            self.policy,
            &self.base_url,
            endpoint,
            None,
        )
        .await?;
        Ok(classify(endpoint, value, self.revision)?.into_raw())
    }
}

pub(crate) fn short_circuit(endpoint: Endpoint) -> GuardrailResponse {
    debug!(
        endpoint = endpoint.path(),
        "blank content, returning safe default without a request"
    );
    GuardrailResponse::safe_default()
}
