// The final moderation result returned to callers.

use serde::{Deserialize, Serialize};

use crate::toxicity::traits::ToxicityVerdict;

/// Why no oracle ran for a message. Both cases allow the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Language identification failed.
    Undetected,
    /// A language was identified but no oracle handles it.
    Unsupported,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Undetected => "Undetected language",
            SkipReason::Unsupported => "Unsupported language",
        }
    }
}

/// Allow/block decision for one message.
///
/// Either `language` and `score` are set (an oracle ran) or `reason` is set
/// (none did). Absent fields are omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModerationResult {
    /// Result for a message an oracle classified.
    pub fn from_verdict(language: &str, verdict: ToxicityVerdict) -> Self {
        Self {
            allowed: !verdict.is_toxic,
            language: Some(language.to_string()),
            score: Some(verdict.score),
            reason: None,
        }
    }

    /// Result for a message no oracle looked at. Always allowed.
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            allowed: true,
            language: None,
            score: None,
            reason: Some(reason.as_str().to_string()),
        }
    }
}
