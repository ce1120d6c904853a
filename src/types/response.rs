//! Detection results returned by the guardrails service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::ProtocolRevision;
use crate::{Error, ErrorContext, Result};

/// Request id used for results produced locally without calling the service.
pub const SAFE_DEFAULT_ID: &str = "guardrails-safe-default";

/// Risk level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    NoRisk,
    LowRisk,
    MediumRisk,
    HighRisk,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRisk => "no_risk",
            Self::LowRisk => "low_risk",
            Self::MediumRisk => "medium_risk",
            Self::HighRisk => "high_risk",
        }
    }

    /// Values used by the legacy protocol revision.
    pub fn from_localized(s: &str) -> Option<Self> {
        match s {
            "无风险" => Some(Self::NoRisk),
            "低风险" => Some(Self::LowRisk),
            "中风险" => Some(Self::MediumRisk),
            "高风险" => Some(Self::HighRisk),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling recommended by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestAction {
    Pass,
    Reject,
    Replace,
}

impl SuggestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Reject => "reject",
            Self::Replace => "replace",
        }
    }

    /// Values used by the legacy protocol revision.
    pub fn from_localized(s: &str) -> Option<Self> {
        match s {
            "通过" => Some(Self::Pass),
            "拒答" => Some(Self::Reject),
            "代答" => Some(Self::Replace),
            _ => None,
        }
    }
}

impl fmt::Display for SuggestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result for one risk dimension (compliance, security or data leakage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCategoryResult {
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl RiskCategoryResult {
    pub fn no_risk() -> Self {
        Self {
            risk_level: RiskLevel::NoRisk,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailResult {
    pub compliance: RiskCategoryResult,
    pub security: RiskCategoryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RiskCategoryResult>,
}

/// Parsed response of a detection endpoint.
///
/// `overall_risk_level` and `suggest_action` are computed by the service and
/// are never re-derived locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailResponse {
    pub id: String,
    pub result: GuardrailResult,
    pub overall_risk_level: RiskLevel,
    pub suggest_action: SuggestAction,
    #[serde(default)]
    pub suggest_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl GuardrailResponse {
    /// The canonical "nothing to check" result. A fresh value on every call.
    pub fn safe_default() -> Self {
        Self {
            id: SAFE_DEFAULT_ID.to_string(),
            result: GuardrailResult {
                compliance: RiskCategoryResult::no_risk(),
                security: RiskCategoryResult::no_risk(),
                data: Some(RiskCategoryResult::no_risk()),
            },
            overall_risk_level: RiskLevel::NoRisk,
            suggest_action: SuggestAction::Pass,
            suggest_answer: None,
            score: Some(1.0),
        }
    }

    /// Decode a response body according to the configured protocol revision.
    pub fn from_value(body: serde_json::Value, revision: ProtocolRevision) -> Result<Self> {
        match revision {
            ProtocolRevision::Current => serde_json::from_value(body).map_err(malformed),
            ProtocolRevision::Legacy => {
                let legacy: LegacyResponse = serde_json::from_value(body).map_err(malformed)?;
                legacy.into_response()
            }
        }
    }

    pub fn is_safe(&self) -> bool {
        self.suggest_action == SuggestAction::Pass
    }

    pub fn is_blocked(&self) -> bool {
        self.suggest_action == SuggestAction::Reject
    }

    /// The service attaches a substitute answer to both `replace` and `reject`.
    pub fn has_substitute(&self) -> bool {
        matches!(
            self.suggest_action,
            SuggestAction::Replace | SuggestAction::Reject
        )
    }

    /// Every triggered category label across all dimensions, duplicates removed.
    pub fn all_categories(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = BTreeSet::new();
        out.extend(self.result.compliance.categories.iter().cloned());
        out.extend(self.result.security.categories.iter().cloned());
        if let Some(data) = &self.result.data {
            out.extend(data.categories.iter().cloned());
        }
        out
    }
}

fn malformed(e: serde_json::Error) -> Error {
    Error::api_with_source(
        format!("Malformed guardrail response: {}", e),
        ErrorContext::new().with_source("response_classifier"),
        e,
    )
}

#[derive(Debug, Deserialize)]
struct LegacyCategoryResult {
    risk_level: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyResult {
    compliance: LegacyCategoryResult,
    security: LegacyCategoryResult,
    #[serde(default)]
    data: Option<LegacyCategoryResult>,
}

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    id: String,
    result: LegacyResult,
    overall_risk_level: String,
    suggest_action: String,
    #[serde(default)]
    suggest_answer: Option<String>,
}

impl LegacyResponse {
    fn into_response(self) -> Result<GuardrailResponse> {
        Ok(GuardrailResponse {
            id: self.id,
            result: GuardrailResult {
                compliance: self.result.compliance.convert("result.compliance")?,
                security: self.result.security.convert("result.security")?,
                data: self
                    .result
                    .data
                    .map(|d| d.convert("result.data"))
                    .transpose()?,
            },
            overall_risk_level: legacy_level(&self.overall_risk_level, "overall_risk_level")?,
            suggest_action: SuggestAction::from_localized(&self.suggest_action).ok_or_else(
                || unknown_value("suggest_action", &self.suggest_action),
            )?,
            suggest_answer: self.suggest_answer,
            score: None,
        })
    }
}

impl LegacyCategoryResult {
    fn convert(self, path: &str) -> Result<RiskCategoryResult> {
        Ok(RiskCategoryResult {
            risk_level: legacy_level(&self.risk_level, &format!("{}.risk_level", path))?,
            categories: self.categories,
        })
    }
}

fn legacy_level(value: &str, path: &str) -> Result<RiskLevel> {
    RiskLevel::from_localized(value).ok_or_else(|| unknown_value(path, value))
}

fn unknown_value(path: &str, value: &str) -> Error {
    Error::api_with_context(
        format!("Malformed guardrail response: unknown value '{}'", value),
        ErrorContext::new()
            .with_field_path(path)
            .with_source("response_classifier"),
    )
}
