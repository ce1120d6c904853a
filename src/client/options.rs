use crate::config::{DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};

/// Per-call options for conversation and image checks.
///
/// ```
/// use xiangxinai::CheckOptions;
///
/// let opts = CheckOptions::new().user_id("tenant-user-42");
/// assert_eq!(opts.user_id.as_deref(), Some("tenant-user-42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Model override; the text or vision default is used when unset.
    pub model: Option<String>,
    /// End user of the calling application, forwarded as `xxai_app_user_id`.
    pub user_id: Option<String>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub(crate) fn text_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub(crate) fn vision_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL)
    }
}
