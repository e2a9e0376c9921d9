// Decision policy: maps (language, text) to a moderation result.
//
// Routing is keyed by language code: "hi" goes to the Hindi oracle, "en" to
// the English one, and anything else allows the message without running a
// classifier. Oracle errors are returned as-is; this layer never turns a
// failed classification into an allow or a block.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::result::{ModerationResult, SkipReason};
use crate::language::traits::LanguageResult;
use crate::toxicity::traits::ToxicityOracle;

/// Which oracle handles a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Hindi,
    English,
}

impl Route {
    /// The route for a language code, or None when no oracle supports it.
    pub fn for_language(code: &str) -> Option<Self> {
        match code {
            "hi" => Some(Route::Hindi),
            "en" => Some(Route::English),
            _ => None,
        }
    }

    /// The language code reported in results for this route.
    pub fn code(&self) -> &'static str {
        match self {
            Route::Hindi => "hi",
            Route::English => "en",
        }
    }
}

/// The process-wide oracles, one per route. Cheap to clone.
#[derive(Clone)]
pub struct OracleSet {
    hindi: Arc<dyn ToxicityOracle>,
    english: Arc<dyn ToxicityOracle>,
}

impl OracleSet {
    pub fn new(hindi: Arc<dyn ToxicityOracle>, english: Arc<dyn ToxicityOracle>) -> Self {
        Self { hindi, english }
    }

    pub fn oracle(&self, route: Route) -> &dyn ToxicityOracle {
        match route {
            Route::Hindi => self.hindi.as_ref(),
            Route::English => self.english.as_ref(),
        }
    }
}

/// Decide whether `text` is allowed, given its identified language.
///
/// Runs at most one oracle. Returns `Err` only when that oracle fails.
pub async fn decide(
    language: &LanguageResult,
    text: &str,
    oracles: &OracleSet,
) -> Result<ModerationResult> {
    let code = match language {
        LanguageResult::Detected(code) => code.as_str(),
        LanguageResult::Undetected => return Ok(ModerationResult::skipped(SkipReason::Undetected)),
    };

    let Some(route) = Route::for_language(code) else {
        // The detected code is not included in the result
        debug!(language = code, "No oracle for language, allowing");
        return Ok(ModerationResult::skipped(SkipReason::Unsupported));
    };

    let oracle = oracles.oracle(route);
    debug!(
        language = route.code(),
        threshold = oracle.threshold(),
        "Routing to oracle"
    );
    let verdict = oracle.classify(text).await?;
    Ok(ModerationResult::from_verdict(route.code(), verdict))
}
