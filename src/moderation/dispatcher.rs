// Moderation dispatcher: the "evaluate message" operation.
//
// Two error paths:
// - language identification is fail-open: any error, including a panic in
//   the detector, becomes LanguageResult::Undetected and the message is
//   allowed;
// - classification is fail-propagate: oracle errors come back as Err and the
//   caller must surface them as a server error.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use super::policy::{decide, OracleSet};
use super::result::ModerationResult;
use crate::language::traits::{identify_fail_open, LanguageIdentifier, LanguageResult};
use crate::output::truncate_chars;

/// Process-wide moderation entry point. Built once at startup and shared
/// read-only across requests.
#[derive(Clone)]
pub struct Moderator {
    identifier: Arc<dyn LanguageIdentifier>,
    oracles: OracleSet,
}

impl Moderator {
    pub fn new(identifier: Arc<dyn LanguageIdentifier>, oracles: OracleSet) -> Self {
        Self {
            identifier,
            oracles,
        }
    }

    /// Identify the language of `text`, mapping every failure to Undetected.
    pub fn identify_language(&self, text: &str) -> LanguageResult {
        identify_fail_open(self.identifier.as_ref(), text)
    }

    /// Decide whether `message` is allowed.
    ///
    /// `Err` means a classifier failed. It is never a verdict, and callers
    /// must not treat it as allow or block.
    pub async fn evaluate(&self, message: &str) -> Result<ModerationResult> {
        let language = self.identify_language(message);
        let result = decide(&language, message, &self.oracles).await?;

        info!(
            language = ?language.code(),
            allowed = result.allowed,
            score = ?result.score,
            reason = ?result.reason,
            "Moderation decision"
        );
        debug!(text_preview = %truncate_chars(message, 50), "Moderated message");

        Ok(result)
    }
}
