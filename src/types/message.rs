//! Conversation message format accepted by the guardrails service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorContext, Result};

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn with_content(role: MessageRole, content: MessageContent) -> Self {
        Self { role, content }
    }
}

/// Parse a loosely-typed conversation entry such as `{"role": "user", "content": "hi"}`.
///
/// A `null` content is accepted and treated as empty text.
impl TryFrom<&serde_json::Value> for Message {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(missing_fields)?;
        let (role, content) = match (obj.get("role"), obj.get("content")) {
            (Some(role), Some(content)) => (role, content),
            _ => return Err(missing_fields()),
        };

        let role = role
            .as_str()
            .ok_or_else(|| {
                Error::validation_with_context(
                    "role must be one of: user, system, assistant",
                    ErrorContext::new()
                        .with_field_path("role")
                        .with_details(format!("got {}", role)),
                )
            })?
            .parse::<MessageRole>()?;

        let content = match content {
            serde_json::Value::Null => MessageContent::Text(String::new()),
            serde_json::Value::String(s) => MessageContent::Text(s.clone()),
            serde_json::Value::Array(_) => {
                let parts: Vec<ContentPart> =
                    serde_json::from_value(content.clone()).map_err(|e| {
                        Error::validation_with_context(
                            "content parts must be text or image_url entries",
                            ErrorContext::new()
                                .with_field_path("content")
                                .with_details(e.to_string()),
                        )
                    })?;
                MessageContent::Parts(parts)
            }
            other => {
                return Err(Error::validation_with_context(
                    "content must be a string or a list of content parts",
                    ErrorContext::new()
                        .with_field_path("content")
                        .with_details(format!("got {}", other)),
                ))
            }
        };

        Ok(Self { role, content })
    }
}

fn missing_fields() -> Error {
    Error::validation_with_context(
        "Each message must have 'role' and 'content' fields",
        ErrorContext::new().with_source("message_parser"),
    )
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(Error::validation_with_context(
                "role must be one of: user, system, assistant",
                ErrorContext::new()
                    .with_field_path("role")
                    .with_details(format!("got '{}'", other)),
            )),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message content (can be string or array of content parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn parts(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }

    /// True when there is nothing worth sending: whitespace-only text, or parts
    /// that are all whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            MessageContent::Text(t) => t.trim().is_empty(),
            MessageContent::Parts(parts) => parts.iter().all(|p| match p {
                ContentPart::Text { text } => text.trim().is_empty(),
                ContentPart::ImageUrl { .. } => false,
            }),
        }
    }

    /// Number of text characters, image URLs excluded.
    pub fn char_len(&self) -> usize {
        match self {
            MessageContent::Text(t) => t.chars().count(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.chars().count(),
                    ContentPart::ImageUrl { .. } => 0,
                })
                .sum(),
        }
    }

    /// Copy with surrounding whitespace removed from every text segment.
    pub fn trimmed(&self) -> Self {
        match self {
            MessageContent::Text(t) => MessageContent::Text(t.trim().to_string()),
            MessageContent::Parts(parts) => MessageContent::Parts(
                parts
                    .iter()
                    .map(|p| match p {
                        ContentPart::Text { text } => ContentPart::text(text.trim()),
                        other => other.clone(),
                    })
                    .collect(),
            ),
        }
    }
}

/// Content part of a multimodal message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// HTTP(S) address or `data:` URI
    pub url: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_part_wire_shape() {
        let part = ContentPart::image_url("data:image/jpeg;base64,AAAA");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}})
        );
    }

    #[test]
    fn text_message_serializes_as_plain_string() {
        let msg = Message::assistant("hello");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "assistant", "content": "hello"})
        );
    }

    #[test]
    fn parse_loose_entry() {
        let msg = Message::try_from(&json!({"role": "system", "content": "be nice"})).unwrap();
        assert_eq!(msg.role, MessageRole::System);
        assert_eq!(msg.content, MessageContent::text("be nice"));
    }

    #[test]
    fn parse_rejects_missing_content() {
        let err = Message::try_from(&json!({"role": "user"})).unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("'role' and 'content'"));
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = Message::try_from(&json!("just a string")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn parse_rejects_unknown_role() {
        let err = Message::try_from(&json!({"role": "tool", "content": "x"})).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.context().field_path.as_deref(), Some("role"));
    }

    #[test]
    fn null_content_is_blank() {
        let msg = Message::try_from(&json!({"role": "user", "content": null})).unwrap();
        assert!(msg.content.is_blank());
    }

    #[test]
    fn blank_detection_for_parts() {
        let blank = MessageContent::parts(vec![ContentPart::text("  ")]);
        assert!(blank.is_blank());
        let with_image = MessageContent::parts(vec![
            ContentPart::text(" "),
            ContentPart::image_url("https://example.com/a.png"),
        ]);
        assert!(!with_image.is_blank());
        assert_eq!(with_image.char_len(), 1);
    }
}
