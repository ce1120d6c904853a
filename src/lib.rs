//! # xiangxinai
//!
//! 象信AI安全护栏服务的 Rust 客户端，提供提示词、对话、模型输出与图片的上下文感知内容检测。
//!
//! Client SDK for the Xiangxin AI guardrails service: context-aware moderation
//! of prompts, conversations, model answers and images.
//!
//! ## Overview
//!
//! Every check returns a [`GuardrailResponse`] with a compliance and a security
//! verdict (plus a data-leak verdict on newer deployments), an overall risk level
//! and a suggested action. Blank input never reaches the network: it yields the
//! canonical no-risk result from [`GuardrailResponse::safe_default`].
//!
//! Transient failures (timeouts, connection errors, 429) are retried within a
//! per-client budget; authentication and validation failures surface at once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xiangxinai::{CheckOptions, GuardrailClient, Message};
//!
//! #[tokio::main]
//! async fn main() -> xiangxinai::Result<()> {
//!     let client = GuardrailClient::builder()
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     let verdict = client.check_prompt("Teach me to make a bomb", None).await?;
//!     println!("{} -> {}", verdict.overall_risk_level, verdict.suggest_action);
//!
//!     let conversation = vec![
//!         Message::user("What is the capital of France?"),
//!         Message::assistant("Paris."),
//!     ];
//!     let verdict = client
//!         .check_conversation(&conversation, &CheckOptions::new().user_id("u-42"))
//!         .await?;
//!     assert!(verdict.is_safe());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! A thread-blocking variant with the same operations lives in [`blocking`].
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Async client, builder, endpoints and per-call options |
//! | [`blocking`] | Thread-blocking client |
//! | [`config`] | Client configuration and protocol revisions |
//! | [`payload`] | Request body construction and blank-input short-circuit |
//! | [`media`] | Image references to base64 data URIs |
//! | [`transport`] | Single HTTP attempt, async and blocking |
//! | [`types`] | Messages, request bodies and detection results |

pub mod blocking;
pub mod client;
pub mod config;
pub mod media;
pub mod payload;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ApiResponse, CheckOptions, Endpoint, GuardrailClient, GuardrailClientBuilder};
pub use config::{ClientConfig, ProtocolRevision};
pub use types::{
    ContentPart, GuardrailResponse, GuardrailResult, Message, MessageContent, MessageRole,
    RiskCategoryResult, RiskLevel, SuggestAction,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
