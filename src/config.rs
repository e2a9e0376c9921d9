use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::toxicity::download::{
    default_model_dir, DEFAULT_ENGLISH_MODEL_URL, DEFAULT_HINDI_MODEL_URL,
};
use crate::toxicity::oracle::{DEFAULT_ENGLISH_THRESHOLD, DEFAULT_HINDI_THRESHOLD};

/// Default port, kept from the service upstream chat clients already call.
pub const DEFAULT_PORT: u16 = 5001;

/// Default bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// field has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory containing one subdirectory per ONNX model
    pub model_dir: PathBuf,
    /// Abusive-probability threshold for Hindi messages
    pub hindi_threshold: f64,
    /// Toxic-label confidence threshold for English messages
    pub english_threshold: f64,
    /// Language detections below this confidence count as undetected
    pub min_language_confidence: f64,
    pub bind: String,
    pub port: u16,
    /// Base URL `download-model` fetches the Hindi model from
    pub hindi_model_url: String,
    /// Base URL `download-model` fetches the English model from
    pub english_model_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys take their defaults; set keys must parse, and thresholds
    /// must lie in [0, 1].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_dir = lookup("PARLEY_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_model_dir);

        let hindi_threshold =
            parse_unit_interval(&lookup, "PARLEY_HINDI_THRESHOLD", DEFAULT_HINDI_THRESHOLD)?;
        let english_threshold =
            parse_unit_interval(&lookup, "PARLEY_ENGLISH_THRESHOLD", DEFAULT_ENGLISH_THRESHOLD)?;
        let min_language_confidence =
            parse_unit_interval(&lookup, "PARLEY_MIN_LANGUAGE_CONFIDENCE", 0.0)?;

        let port = match lookup("PARLEY_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PARLEY_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            model_dir,
            hindi_threshold,
            english_threshold,
            min_language_confidence,
            bind: lookup("PARLEY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            hindi_model_url: lookup("PARLEY_HINDI_MODEL_URL")
                .unwrap_or_else(|| DEFAULT_HINDI_MODEL_URL.to_string()),
            english_model_url: lookup("PARLEY_ENGLISH_MODEL_URL")
                .unwrap_or_else(|| DEFAULT_ENGLISH_MODEL_URL.to_string()),
        })
    }

    /// Check that both ONNX models are on disk.
    /// Call this before anything that loads the classifiers.
    pub fn require_models(&self) -> Result<()> {
        if !crate::toxicity::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "ONNX model files not found in {}\n\
                 Run `parley download-model` to download them,\n\
                 or set PARLEY_MODEL_DIR to a directory that has them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

/// Parse an optional float that must lie in [0, 1].
fn parse_unit_interval<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("{key} must be a number, got {raw:?}"))?;

    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{key} must be between 0 and 1, got {value}");
    }
    Ok(value)
}
