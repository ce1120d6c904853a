//! Core type definitions: conversation messages, request bodies and detection results.

pub mod message;
pub mod request;
pub mod response;

pub use message::{ContentPart, ImageUrl, Message, MessageContent, MessageRole};
pub use request::{ExtraBody, GuardrailRequest, InputCheckRequest, OutputCheckRequest};
pub use response::{
    GuardrailResponse, GuardrailResult, RiskCategoryResult, RiskLevel, SuggestAction,
    SAFE_DEFAULT_ID,
};
