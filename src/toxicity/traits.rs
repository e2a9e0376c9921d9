// Toxicity traits: the swap-ready abstractions.
//
// Two engine shapes exist because the two language paths use different kinds
// of model: a binary sequence classifier (probability of the abusive class)
// and a multi-label text classifier (best label plus its score). Both sit
// behind ToxicityOracle, which is what the decision policy routes to.

use anyhow::Result;
use async_trait::async_trait;

/// The result of classifying a single message with one oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToxicityVerdict {
    /// Whether the score crossed the oracle's threshold.
    pub is_toxic: bool,
    /// The probability or confidence (0.0 to 1.0) the threshold was applied to.
    pub score: f64,
}

/// The single best label produced by a text classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// A two-class sequence classifier. Returns the probability of the positive
/// (abusive) class.
#[async_trait]
pub trait BinaryClassifier: Send + Sync {
    async fn positive_probability(&self, text: &str) -> Result<f64>;
}

/// A text classifier that reports its highest-scoring label.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn top_label(&self, text: &str) -> Result<LabelScore>;
}

/// A language-specific toxicity oracle: text in, verdict out.
///
/// Implementations must be safe to call concurrently from many requests and
/// must never mutate shared state in a way that changes later verdicts.
/// Failures are returned as `Err` and are never mapped to a default verdict.
#[async_trait]
pub trait ToxicityOracle: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ToxicityVerdict>;

    /// The threshold this oracle applies to its score.
    fn threshold(&self) -> f64;
}
