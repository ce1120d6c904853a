use thiserror::Error;

/// Structured error context for branching on and debugging failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path of the offending input (e.g., "messages[1].role")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the service's `detail` message)
    pub details: Option<String>,
    /// Component that raised the error (e.g., "payload_builder", "retry_engine")
    pub source: Option<String>,
    /// HTTP status returned by the service, when one was received
    pub status_code: Option<u16>,
    /// Endpoint path that was called
    pub endpoint: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Failure kind, for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    RateLimited,
    Api,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type of the SDK.
///
/// The set of variants is closed: every failure surfaced to a caller is one of
/// these four kinds.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed caller input or a 422 from the service. Never retried.
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// Credential rejected by the service. Never retried.
    #[error("Authentication error: {message}{}", format_context(.context))]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    /// Retry budget exhausted while the service kept answering 429.
    #[error("Rate limit error: {message}{}", format_context(.context))]
    RateLimited {
        message: String,
        context: ErrorContext,
    },

    /// Everything else: unexpected statuses, network exhaustion, malformed bodies.
    #[error("API error: {message}{}", format_context(.context))]
    Api {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(status) = ctx.status_code {
        parts.push(format!("status: {}", status));
    }
    if let Some(ref endpoint) = ctx.endpoint {
        parts.push(format!("endpoint: {}", endpoint));
    }
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn authentication_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Authentication {
            message: msg.into(),
            context,
        }
    }

    pub fn rate_limited_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::RateLimited {
            message: msg.into(),
            context,
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::api_with_context(msg, ErrorContext::new())
    }

    pub fn api_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Api {
            message: msg.into(),
            context,
            source: None,
        }
    }

    /// Create a generic error that keeps the underlying cause.
    pub fn api_with_source(
        msg: impl Into<String>,
        context: ErrorContext,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Api {
            message: msg.into(),
            context,
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Api { .. } => ErrorKind::Api,
        }
    }

    /// Human-readable message without the context suffix.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation { message, .. }
            | Error::Authentication { message, .. }
            | Error::RateLimited { message, .. }
            | Error::Api { message, .. } => message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Error::Validation { context, .. }
            | Error::Authentication { context, .. }
            | Error::RateLimited { context, .. }
            | Error::Api { context, .. } => context,
        }
    }

    /// HTTP status attached to the failure, if the service answered.
    pub fn status_code(&self) -> Option<u16> {
        self.context().status_code
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimited
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::api_with_source(
            format!("Serialization error: {}", e),
            ErrorContext::new().with_source("serde_json"),
            e,
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::api_with_source(
            format!("I/O error: {}", e),
            ErrorContext::new().with_source("io"),
            e,
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let mut context = ErrorContext::new().with_source("http");
        if let Some(status) = e.status() {
            context = context.with_status_code(status.as_u16());
        }
        Error::api_with_source(format!("HTTP error: {}", e), context, e)
    }
}
