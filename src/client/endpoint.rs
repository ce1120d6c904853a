//! Endpoints of the guardrails API

use crate::transport::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Single user input check.
    Input,
    /// Prompt + model output pair check.
    Output,
    /// Conversation and image checks.
    Guardrails,
    Health,
    Models,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Input => "/guardrails/input",
            Endpoint::Output => "/guardrails/output",
            Endpoint::Guardrails => "/guardrails",
            Endpoint::Health => "/guardrails/health",
            Endpoint::Models => "/guardrails/models",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Input | Endpoint::Output | Endpoint::Guardrails => Method::Post,
            Endpoint::Health | Endpoint::Models => Method::Get,
        }
    }

    /// Whether a successful body is a detection result.
    pub fn is_detection(&self) -> bool {
        matches!(
            self,
            Endpoint::Input | Endpoint::Output | Endpoint::Guardrails
        )
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.path())
    }
}
