// Language identifier trait and the result type the dispatcher routes on.

use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::Result;
use tracing::debug;

/// Outcome of language identification for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageResult {
    /// A language code (ISO 639-1 where one exists, e.g. "en", "hi").
    Detected(String),
    /// Identification failed for any reason.
    Undetected,
}

impl LanguageResult {
    /// The detected code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            LanguageResult::Detected(code) => Some(code.as_str()),
            LanguageResult::Undetected => None,
        }
    }
}

/// Identifies the language of a piece of text.
///
/// Implementations report failure through `Err` (or even by panicking).
/// They never decide what a failure means for moderation: `identify_fail_open`
/// owns the mapping from failure to `LanguageResult::Undetected`.
pub trait LanguageIdentifier: Send + Sync {
    /// Return the language code for `text`.
    fn identify(&self, text: &str) -> Result<String>;
}

/// Identify the language of `text`, mapping every failure to Undetected.
///
/// Both an `Err` and a panic inside the identifier count as failures.
pub fn identify_fail_open(identifier: &dyn LanguageIdentifier, text: &str) -> LanguageResult {
    match catch_unwind(AssertUnwindSafe(|| identifier.identify(text))) {
        Ok(Ok(code)) => LanguageResult::Detected(code),
        Ok(Err(e)) => {
            debug!(error = %e, "Language identification failed");
            LanguageResult::Undetected
        }
        Err(_) => {
            debug!("Language identifier panicked");
            LanguageResult::Undetected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Panicking;

    impl LanguageIdentifier for Panicking {
        fn identify(&self, _text: &str) -> Result<String> {
            panic!("detector bug")
        }
    }

    struct Erroring;

    impl LanguageIdentifier for Erroring {
        fn identify(&self, _text: &str) -> Result<String> {
            anyhow::bail!("no features in text")
        }
    }

    struct Fixed(&'static str);

    impl LanguageIdentifier for Fixed {
        fn identify(&self, _text: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_success_is_detected() {
        assert_eq!(
            identify_fail_open(&Fixed("hi"), "namaste"),
            LanguageResult::Detected("hi".to_string())
        );
    }

    #[test]
    fn test_error_is_undetected() {
        assert_eq!(identify_fail_open(&Erroring, ""), LanguageResult::Undetected);
    }

    #[test]
    fn test_panic_is_undetected() {
        assert_eq!(identify_fail_open(&Panicking, "hello"), LanguageResult::Undetected);
    }

    #[test]
    fn test_code_accessor() {
        assert_eq!(LanguageResult::Detected("en".into()).code(), Some("en"));
        assert_eq!(LanguageResult::Undetected.code(), None);
    }
}
