// Whatlang-backed language identifier.
//
// Whatlang is a trigram-based detector that runs fully offline with no model
// files. It reports ISO 639-3 codes ("eng", "hin"); routing uses ISO 639-1
// ("en", "hi"), so codes are mapped here before leaving the detector.

use anyhow::Result;
use tracing::debug;
use whatlang::Lang;

use super::traits::LanguageIdentifier;

/// Language identifier using the `whatlang` crate.
#[derive(Debug, Clone, Default)]
pub struct WhatlangIdentifier {
    /// Detections below this confidence (0.0 to 1.0) are treated as failures.
    /// 0.0 accepts every detection whatlang produces.
    pub min_confidence: f64,
}

impl WhatlangIdentifier {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            anyhow::bail!("No features in text: nothing to identify");
        }

        let info = whatlang::detect(text)
            .ok_or_else(|| anyhow::anyhow!("Language could not be identified"))?;

        if info.confidence() < self.min_confidence {
            anyhow::bail!(
                "Language detection confidence {:.2} below minimum {:.2} (best guess: {})",
                info.confidence(),
                self.min_confidence,
                info.lang().code()
            );
        }

        let code = iso_639_1(info.lang());
        debug!(
            language = code,
            confidence = info.confidence(),
            reliable = info.is_reliable(),
            "Identified language"
        );
        Ok(code.to_string())
    }
}

/// Map a whatlang language to its two-letter ISO 639-1 code.
///
/// Languages without a mapping here keep whatlang's three-letter code. They
/// are unsupported for moderation either way, so the exact code only shows
/// up in logs.
fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Ben => "bn",
        Lang::Mar => "mr",
        Lang::Nep => "ne",
        Lang::Urd => "ur",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Guj => "gu",
        Lang::Pan => "pa",
        other => other.code(),
    }
}
