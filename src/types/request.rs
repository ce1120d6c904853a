//! Request bodies for the guardrail detection endpoints.

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::{Error, ErrorContext, Result};

/// Body of `POST /guardrails` (conversation and image checks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_body: Option<ExtraBody>,
}

impl GuardrailRequest {
    /// Build a request, rejecting an empty message list.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Result<Self> {
        if messages.is_empty() {
            return Err(Error::validation_with_context(
                "messages cannot be empty",
                ErrorContext::new().with_field_path("messages"),
            ));
        }
        Ok(Self {
            model: model.into(),
            messages,
            extra_body: None,
        })
    }

    /// Attach the tenant application's user id out of band of the messages.
    pub fn with_user_id(mut self, user_id: Option<&str>) -> Self {
        self.extra_body = user_id.map(|id| ExtraBody {
            xxai_app_user_id: id.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraBody {
    pub xxai_app_user_id: String,
}

/// Body of `POST /guardrails/input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCheckRequest {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xxai_app_user_id: Option<String>,
}

/// Body of `POST /guardrails/output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCheckRequest {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xxai_app_user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_messages_rejected() {
        let err = GuardrailRequest::new("m", Vec::new()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn user_id_goes_to_extra_body() {
        let req = GuardrailRequest::new("m", vec![Message::user("hi")])
            .unwrap()
            .with_user_id(Some("u-1"));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hi"}],
                "extra_body": {"xxai_app_user_id": "u-1"}
            })
        );
    }

    #[test]
    fn absent_user_id_is_omitted() {
        let req = InputCheckRequest {
            input: "hello".into(),
            xxai_app_user_id: None,
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"input": "hello"}));
    }
}
