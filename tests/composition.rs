// Composition tests: the full moderation chain with in-memory engines.
//
// These tests exercise the data flow between modules:
//   Identifier -> Moderator -> Decision policy -> Oracle -> Engine -> Result
// using fixed-answer identifiers and classifiers, so no model files or
// network access are needed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use parley::language::traits::LanguageIdentifier;
use parley::moderation::{ModerationResult, Moderator, OracleSet, SkipReason};
use parley::toxicity::oracle::{EnglishToxicityOracle, HindiAbuseOracle};
use parley::toxicity::traits::{BinaryClassifier, LabelScore, TextClassifier};

// ============================================================
// Fakes
// ============================================================

/// Returns a preset language per exact message; anything else fails.
struct TableIdentifier(HashMap<&'static str, &'static str>);

impl LanguageIdentifier for TableIdentifier {
    fn identify(&self, text: &str) -> Result<String> {
        self.0
            .get(text)
            .map(|code| code.to_string())
            .ok_or_else(|| anyhow::anyhow!("No features in text"))
    }
}

/// Hindi engine returning a preset abusive probability per message.
struct TableBinary {
    scores: HashMap<&'static str, f64>,
    calls: AtomicUsize,
}

#[async_trait]
impl BinaryClassifier for TableBinary {
    async fn positive_probability(&self, text: &str) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scores
            .get(text)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Hindi model failed on input"))
    }
}

/// English engine returning a preset top label per message.
struct TableText {
    labels: HashMap<&'static str, (&'static str, f64)>,
    calls: AtomicUsize,
}

#[async_trait]
impl TextClassifier for TableText {
    async fn top_label(&self, text: &str) -> Result<LabelScore> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.labels
            .get(text)
            .map(|(label, score)| LabelScore {
                label: label.to_string(),
                score: *score,
            })
            .ok_or_else(|| anyhow::anyhow!("English model failed on input"))
    }
}

struct Fixture {
    moderator: Moderator,
    hindi: Arc<TableBinary>,
    english: Arc<TableText>,
}

impl Fixture {
    fn oracle_calls(&self) -> usize {
        self.hindi.calls.load(Ordering::SeqCst) + self.english.calls.load(Ordering::SeqCst)
    }
}

fn fixture() -> Fixture {
    let identifier = TableIdentifier(HashMap::from([
        ("you are worthless", "en"),
        ("have a lovely day", "en"),
        ("you are kind of annoying", "en"),
        ("this is an insult", "en"),
        ("english model crashes", "en"),
        ("मैं ठीक हूँ", "hi"),
        ("गाली", "hi"),
        ("सीमा", "hi"),
        ("hindi model crashes", "hi"),
        ("Bonjour, comment allez-vous ?", "fr"),
        ("Guten Morgen", "de"),
    ]));

    let hindi = Arc::new(TableBinary {
        scores: HashMap::from([("मैं ठीक हूँ", 0.12), ("गाली", 0.91), ("सीमा", 0.5)]),
        calls: AtomicUsize::new(0),
    });

    let english = Arc::new(TableText {
        labels: HashMap::from([
            ("you are worthless", ("toxic", 0.97)),
            ("have a lovely day", ("toxic", 0.01)),
            ("you are kind of annoying", ("toxic", 0.90)),
            ("this is an insult", ("insult", 0.99)),
        ]),
        calls: AtomicUsize::new(0),
    });

    let oracles = OracleSet::new(
        Arc::new(HindiAbuseOracle::with_default_threshold(hindi.clone())),
        Arc::new(EnglishToxicityOracle::with_default_threshold(english.clone())),
    );

    Fixture {
        moderator: Moderator::new(Arc::new(identifier), oracles),
        hindi,
        english,
    }
}

fn classified(allowed: bool, language: &str, score: f64) -> ModerationResult {
    ModerationResult {
        allowed,
        language: Some(language.to_string()),
        score: Some(score),
        reason: None,
    }
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn toxic_english_message_is_blocked() {
    let f = fixture();
    let result = f.moderator.evaluate("you are worthless").await.unwrap();
    assert_eq!(result, classified(false, "en", 0.97));
}

#[tokio::test]
async fn benign_hindi_message_is_allowed() {
    let f = fixture();
    let result = f.moderator.evaluate("मैं ठीक हूँ").await.unwrap();
    assert_eq!(result, classified(true, "hi", 0.12));
}

#[tokio::test]
async fn empty_message_is_undetected_and_allowed() {
    let f = fixture();
    let result = f.moderator.evaluate("").await.unwrap();
    assert_eq!(result, ModerationResult::skipped(SkipReason::Undetected));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({ "allowed": true, "reason": "Undetected language" })
    );
    assert_eq!(f.oracle_calls(), 0);
}

#[tokio::test]
async fn french_message_is_unsupported_and_allowed() {
    let f = fixture();
    let result = f
        .moderator
        .evaluate("Bonjour, comment allez-vous ?")
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({ "allowed": true, "reason": "Unsupported language" })
    );
    assert_eq!(f.oracle_calls(), 0);
}

// ============================================================
// Threshold semantics
// ============================================================

#[tokio::test]
async fn hindi_blocks_at_exactly_half() {
    let f = fixture();
    let result = f.moderator.evaluate("सीमा").await.unwrap();
    assert_eq!(result, classified(false, "hi", 0.5));
}

#[tokio::test]
async fn hindi_abusive_message_is_blocked() {
    let f = fixture();
    let result = f.moderator.evaluate("गाली").await.unwrap();
    assert!(!result.allowed);
    assert_eq!(result.score, Some(0.91));
}

#[tokio::test]
async fn english_toxic_label_below_strict_threshold_is_allowed() {
    // 0.90 would block on the Hindi path but not on the English one
    let f = fixture();
    let result = f.moderator.evaluate("you are kind of annoying").await.unwrap();
    assert_eq!(result, classified(true, "en", 0.90));
}

#[tokio::test]
async fn english_non_toxic_label_is_allowed_with_its_score() {
    let f = fixture();
    let result = f.moderator.evaluate("this is an insult").await.unwrap();
    assert_eq!(result, classified(true, "en", 0.99));
}

#[tokio::test]
async fn english_low_toxic_score_is_allowed() {
    let f = fixture();
    let result = f.moderator.evaluate("have a lovely day").await.unwrap();
    assert_eq!(result, classified(true, "en", 0.01));
}

#[tokio::test]
async fn custom_thresholds_apply_per_language() {
    let f = fixture();
    let oracles = OracleSet::new(
        Arc::new(HindiAbuseOracle::new(f.hindi.clone(), 0.95)),
        Arc::new(EnglishToxicityOracle::new(f.english.clone(), 0.5)),
    );
    let identifier = TableIdentifier(HashMap::from([
        ("गाली", "hi"),
        ("you are kind of annoying", "en"),
    ]));
    let moderator = Moderator::new(Arc::new(identifier), oracles);

    assert!(moderator.evaluate("गाली").await.unwrap().allowed);
    assert!(!moderator.evaluate("you are kind of annoying").await.unwrap().allowed);
}

// ============================================================
// Routing and failure policy
// ============================================================

#[tokio::test]
async fn exactly_one_oracle_runs_per_supported_message() {
    let f = fixture();
    f.moderator.evaluate("you are worthless").await.unwrap();
    assert_eq!(f.english.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.hindi.calls.load(Ordering::SeqCst), 0);

    f.moderator.evaluate("मैं ठीक हूँ").await.unwrap();
    assert_eq!(f.english.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.hindi.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn german_is_unsupported_without_language_field() {
    let f = fixture();
    let result = f.moderator.evaluate("Guten Morgen").await.unwrap();
    assert!(result.allowed);
    assert!(result.language.is_none());
    assert!(result.score.is_none());
    assert_eq!(result.reason.as_deref(), Some("Unsupported language"));
}

#[tokio::test]
async fn hindi_engine_failure_is_an_error_not_a_verdict() {
    let f = fixture();
    let err = f.moderator.evaluate("hindi model crashes").await.unwrap_err();
    assert!(format!("{err:#}").contains("Hindi model failed on input"));
}

#[tokio::test]
async fn english_engine_failure_is_an_error_not_a_verdict() {
    let f = fixture();
    assert!(f.moderator.evaluate("english model crashes").await.is_err());
}

#[tokio::test]
async fn evaluation_is_idempotent() {
    let f = fixture();
    for message in ["you are worthless", "मैं ठीक हूँ", "", "Guten Morgen"] {
        let first = f.moderator.evaluate(message).await.unwrap();
        let second = f.moderator.evaluate(message).await.unwrap();
        assert_eq!(first, second, "Results differ for {message:?}");
    }
}

#[tokio::test]
async fn allowed_is_negation_of_toxicity_for_classified_messages() {
    let f = fixture();
    for message in ["you are worthless", "have a lovely day", "गाली", "मैं ठीक हूँ"] {
        let result = f.moderator.evaluate(message).await.unwrap();
        let score = result.score.unwrap();
        match result.language.as_deref() {
            Some("hi") => assert_eq!(result.allowed, score < 0.5),
            Some("en") => assert!(result.allowed || score >= 0.95),
            other => panic!("unexpected language {other:?}"),
        }
        assert!(result.reason.is_none());
    }
}

#[tokio::test]
async fn concurrent_requests_share_one_moderator() {
    let f = fixture();
    let moderator = Arc::new(f.moderator);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let moderator = Arc::clone(&moderator);
            tokio::spawn(async move {
                let message = if i % 2 == 0 { "you are worthless" } else { "मैं ठीक हूँ" };
                moderator.evaluate(message).await.unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert_eq!(result.allowed, i % 2 == 1);
    }
}
