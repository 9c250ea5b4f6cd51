//! Classification verdict types.

use serde::{Deserialize, Serialize};

/// Which check produced a bot verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// User-agent signature or missing user-agent
    UserAgent,
    /// Known bot IP prefix
    IpRange,
    /// Accumulated behavioral indicators
    Behavioral,
}

impl DetectionMethod {
    /// Returns the method as a string for stats keys and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::UserAgent => "user-agent",
            DetectionMethod::IpRange => "ip-range",
            DetectionMethod::Behavioral => "behavioral",
        }
    }
}

/// Outcome of classifying one request.
///
/// Produced fresh per entry and never mutated afterwards. `reasons` is
/// non-empty whenever `is_bot` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub is_bot: bool,

    /// Certainty of the verdict (0-100).
    pub confidence: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<DetectionMethod>,

    /// Human-readable triggers, in the order they fired.
    pub reasons: Vec<String>,
}

impl Verdict {
    /// Verdict for traffic no check objected to.
    pub fn human() -> Self {
        Self {
            is_bot: false,
            confidence: 0,
            method: None,
            reasons: vec![],
        }
    }

    /// Bot verdict with a fixed confidence from the given method.
    pub fn bot(confidence: u8, method: DetectionMethod) -> Self {
        Self {
            is_bot: true,
            confidence: confidence.min(100),
            method: Some(method),
            reasons: vec![],
        }
    }

    /// Add a reason to the verdict.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }
}
