//! 请求构建：输入校验、空白内容短路与多模态消息组装。
//!
//! Payload construction. Every builder either produces a wire request or
//! reports that there is nothing to check, in which case the caller answers with
//! [`GuardrailResponse::safe_default`](crate::GuardrailResponse::safe_default) without touching the network.

use crate::config::ProtocolRevision;
use crate::types::{
    ContentPart, GuardrailRequest, InputCheckRequest, Message,
    MessageContent, MessageRole, OutputCheckRequest,
};
use crate::{Error, ErrorContext, Result};

/// Outcome of payload construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared<T> {
    /// Nothing to check; the canonical no-risk result applies.
    SafeDefault,
    Send(T),
}

impl<T> Prepared<T> {
    pub fn is_safe_default(&self) -> bool {
        matches!(self, Prepared::SafeDefault)
    }
}

/// Builds request bodies under the limits of one protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBuilder {
    revision: ProtocolRevision,
}

impl PayloadBuilder {
    pub fn new(revision: ProtocolRevision) -> Self {
        Self { revision }
    }

    /// Single user input for `/guardrails/input`.
    pub fn prompt(&self, content: &str, user_id: Option<&str>) -> Prepared<InputCheckRequest> {
        let content = content.trim();
        if content.is_empty() {
            return Prepared::SafeDefault;
        }
        Prepared::Send(InputCheckRequest {
            input: content.to_string(),
            xxai_app_user_id: user_id.map(str::to_string),
        })
    }

    /// Prompt and model output for `/guardrails/output`. Either side may be empty, not both.
    pub fn response_pair(
        &self,
        prompt: &str,
        response: &str,
        user_id: Option<&str>,
    ) -> Prepared<OutputCheckRequest> {
        let (prompt, response) = (prompt.trim(), response.trim());
        if prompt.is_empty() && response.is_empty() {
            return Prepared::SafeDefault;
        }
        Prepared::Send(OutputCheckRequest {
            input: prompt.to_string(),
            output: response.to_string(),
            xxai_app_user_id: user_id.map(str::to_string),
        })
    }

    /// Conversation for `/guardrails`.
    ///
    /// Blank messages are dropped and the rest keep their relative order, with
    /// their text trimmed.
    pub fn conversation(
        &self,
        messages: &[Message],
        model: &str,
        user_id: Option<&str>,
    ) -> Result<Prepared<GuardrailRequest>> {
        if messages.is_empty() {
            return Err(Error::validation_with_context(
                "Messages cannot be empty",
                ErrorContext::new()
                    .with_field_path("messages")
                    .with_source("payload_builder"),
            ));
        }

        let mut kept = Vec::with_capacity(messages.len());
        for (idx, msg) in messages.iter().enumerate() {
            if msg.content.is_blank() {
                continue;
            }
            let content = msg.content.trimmed();
            self.check_length(&content, idx)?;
            kept.push(Message::with_content(msg.role, content));
        }

        if kept.is_empty() {
            return Ok(Prepared::SafeDefault);
        }
        Ok(Prepared::Send(
            GuardrailRequest::new(model, kept)?.with_user_id(user_id),
        ))
    }

    /// Conversation given as loose JSON entries, validated before anything else.
    pub fn conversation_json(
        &self,
        messages: &[serde_json::Value],
        model: &str,
        user_id: Option<&str>,
    ) -> Result<Prepared<GuardrailRequest>> {
        let parsed = parse_messages(messages)?;
        self.conversation(&parsed, model, user_id)
    }

    /// One user message with an optional leading text part followed by the
    /// images in input order.
    pub fn image_message(
        &self,
        prompt: &str,
        image_urls: Vec<String>,
        model: &str,
        user_id: Option<&str>,
    ) -> Result<GuardrailRequest> {
        if image_urls.is_empty() {
            return Err(empty_images());
        }

        let mut parts = Vec::with_capacity(image_urls.len() + 1);
        let prompt = prompt.trim();
        if !prompt.is_empty() {
            parts.push(ContentPart::text(prompt));
        }
        parts.extend(image_urls.into_iter().map(ContentPart::image_url));

        let content = MessageContent::parts(parts);
        self.check_length(&content, 0)?;
        Ok(
            GuardrailRequest::new(model, vec![Message::with_content(MessageRole::User, content)])?
                .with_user_id(user_id),
        )
    }

    fn check_length(&self, content: &MessageContent, idx: usize) -> Result<()> {
        let max = self.revision.max_content_chars();
        let len = content.char_len();
        if len > max {
            return Err(Error::validation_with_context(
                format!("content too long (max {} characters)", max),
                ErrorContext::new()
                    .with_field_path(format!("messages[{}].content", idx))
                    .with_details(format!("got {} characters", len))
                    .with_source("payload_builder"),
            ));
        }
        Ok(())
    }
}

/// Reject an image list that is empty or holds an empty reference, before any
/// file or network access.
pub fn check_image_references<S: AsRef<str>>(images: &[S]) -> Result<()> {
    if images.is_empty() {
        return Err(empty_images());
    }
    if let Some(idx) = images.iter().position(|i| i.as_ref().trim().is_empty()) {
        return Err(Error::validation_with_context(
            "Image path cannot be empty",
            ErrorContext::new()
                .with_field_path(format!("images[{}]", idx))
                .with_source("payload_builder"),
        ));
    }
    Ok(())
}

fn empty_images() -> Error {
    Error::validation_with_context(
        "Images list cannot be empty",
        ErrorContext::new()
            .with_field_path("images")
            .with_source("payload_builder"),
    )
}

fn parse_messages(messages: &[serde_json::Value]) -> Result<Vec<Message>> {
    if messages.is_empty() {
        return Err(Error::validation_with_context(
            "Messages cannot be empty",
            ErrorContext::new()
                .with_field_path("messages")
                .with_source("payload_builder"),
        ));
    }
    messages
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            Message::try_from(value).map_err(|e| match e {
                Error::Validation { message, context } => {
                    let field = match context.field_path {
                        Some(f) => format!("messages[{}].{}", idx, f),
                        None => format!("messages[{}]", idx),
                    };
                    Error::Validation {
                        message,
                        context: ErrorContext {
                            field_path: Some(field),
                            ..context
                        },
                    }
                }
                other => other,
            })
        })
        .collect()
}
