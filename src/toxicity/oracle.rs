// Language-specific toxicity oracles.
//
// The Hindi and English paths are asymmetric: Hindi blocks at
// an abusive probability of 0.5, English only when the top label is "toxic"
// AND its confidence reaches 0.95. Each oracle carries its own threshold so
// the two can be tuned independently.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::traits::{BinaryClassifier, TextClassifier, ToxicityOracle, ToxicityVerdict};

/// Default abusive-probability threshold for Hindi messages.
pub const DEFAULT_HINDI_THRESHOLD: f64 = 0.5;

/// Default confidence threshold for English messages.
pub const DEFAULT_ENGLISH_THRESHOLD: f64 = 0.95;

/// The label an English classifier must produce for a message to be blocked.
pub const TOXIC_LABEL: &str = "toxic";

/// Hindi oracle: blocks when the abusive-class probability reaches the threshold.
pub struct HindiAbuseOracle {
    classifier: Arc<dyn BinaryClassifier>,
    threshold: f64,
}

impl HindiAbuseOracle {
    pub fn new(classifier: Arc<dyn BinaryClassifier>, threshold: f64) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    pub fn with_default_threshold(classifier: Arc<dyn BinaryClassifier>) -> Self {
        Self::new(classifier, DEFAULT_HINDI_THRESHOLD)
    }
}

#[async_trait]
impl ToxicityOracle for HindiAbuseOracle {
    async fn classify(&self, text: &str) -> Result<ToxicityVerdict> {
        let score = self
            .classifier
            .positive_probability(text)
            .await
            .context("Hindi toxicity classification failed")?;

        let verdict = ToxicityVerdict {
            is_toxic: score >= self.threshold,
            score,
        };
        debug!(
            score = verdict.score,
            threshold = self.threshold,
            is_toxic = verdict.is_toxic,
            "Hindi oracle verdict"
        );
        Ok(verdict)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// English oracle: blocks only when the top label is "toxic" and its score
/// reaches the threshold.
pub struct EnglishToxicityOracle {
    classifier: Arc<dyn TextClassifier>,
    threshold: f64,
}

impl EnglishToxicityOracle {
    pub fn new(classifier: Arc<dyn TextClassifier>, threshold: f64) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    pub fn with_default_threshold(classifier: Arc<dyn TextClassifier>) -> Self {
        Self::new(classifier, DEFAULT_ENGLISH_THRESHOLD)
    }
}

#[async_trait]
impl ToxicityOracle for EnglishToxicityOracle {
    async fn classify(&self, text: &str) -> Result<ToxicityVerdict> {
        let top = self
            .classifier
            .top_label(text)
            .await
            .context("English toxicity classification failed")?;

        // The reported score is the label's confidence even when the label
        // isn't "toxic", since that is the number the caller sees as `score`.
        let verdict = ToxicityVerdict {
            is_toxic: top.label == TOXIC_LABEL && top.score >= self.threshold,
            score: top.score,
        };
        debug!(
            label = %top.label,
            score = verdict.score,
            threshold = self.threshold,
            is_toxic = verdict.is_toxic,
            "English oracle verdict"
        );
        Ok(verdict)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
