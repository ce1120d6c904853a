//! Guardrail client: public facade over payload building, retrying execution
//! and response classification.
//!
//! The public surface is the two facades ([`GuardrailClient`] and
//! [`blocking::GuardrailClient`](crate::blocking::GuardrailClient)), their
//! builder and per-call options. Everything else under `src/client/` is shared
//! machinery.

pub mod builder;
pub mod core;
pub mod endpoint;
pub(crate) mod execution;
pub mod options;
pub(crate) mod policy;
pub mod response;

pub use builder::GuardrailClientBuilder;
pub use core::GuardrailClient;
pub use endpoint::Endpoint;
pub use options::CheckOptions;
pub use response::ApiResponse;

use crate::{Error, ErrorContext};

pub(crate) fn closed_error() -> Error {
    Error::api_with_context(
        "Client session is closed",
        ErrorContext::new().with_source("client_session"),
    )
}
