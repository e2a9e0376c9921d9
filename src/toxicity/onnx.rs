// Local ONNX classifiers for the two language paths.
//
// Both models are BERT-family sequence classifiers exported to ONNX:
// - Hindi: a MuRIL fine-tune with two output classes (non-abusive, abusive).
//   Softmax over the logits, class 1 is the abusive probability.
// - English: toxic-bert, a multi-label model. The label names and activation
//   come from its config.json, mirroring how the transformers
//   text-classification pipeline picks its single best label.
//
// Everything runs on the local CPU. Inputs are truncated to 512 tokens.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::download::{MODEL_CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE};
use super::traits::{BinaryClassifier, LabelScore, TextClassifier};

/// Maximum sequence length fed to either model; longer inputs are truncated.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// A loaded ONNX session plus its tokenizer.
///
/// Session::run takes &mut self, so the session lives behind a Mutex; both
/// halves are Arc'd so inference can move into spawn_blocking. Requests are
/// serialized per model, which is fine for single-message inference.
struct OnnxModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxModel {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    fn load(model_dir: &Path, name: &str) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "{name} model file not found: {}\nRun `parley download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "{name} tokenizer file not found: {}\nRun `parley download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load {name} ONNX model from {}", model_path.display())
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load {name} tokenizer: {}", e))?;
        configure_tokenizer(&mut tokenizer)
            .with_context(|| format!("Failed to configure {name} tokenizer"))?;

        debug!("Loaded {name} ONNX model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Tokenize `text`, run one forward pass, and return the raw logits row.
    ///
    /// CPU-bound work is offloaded to spawn_blocking so the async runtime
    /// stays responsive for other requests.
    async fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || logits_sync(&session, &tokenizer, &text))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Truncate every encoding to MAX_SEQUENCE_LENGTH tokens and turn padding off.
fn configure_tokenizer(tokenizer: &mut Tokenizer) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQUENCE_LENGTH,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Invalid truncation settings: {}", e))?;
    // Single-message inference never needs padding
    tokenizer.with_padding(None);
    Ok(())
}

/// Synchronous inference for a single text. Output shape is [1, num_labels].
fn logits_sync(session: &Mutex<Session>, tokenizer: &Tokenizer, text: &str) -> Result<Vec<f32>> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

    let shape = [1_i64, input_ids.len() as i64];

    let input_ids_tensor =
        Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    let mut session = session
        .lock()
        .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

    let outputs = session
        .run(ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor
        })
        .context("ONNX inference failed")?;

    let (_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .context("Failed to extract output tensor")?;
    let logits = data.to_vec();

    Ok(logits)
}

/// Binary abusive/non-abusive classifier (the Hindi engine).
pub struct OnnxBinaryClassifier {
    model: OnnxModel,
}

impl OnnxBinaryClassifier {
    /// Load the model from `model_dir`. Expects `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::load(model_dir, "Hindi")?,
        })
    }
}

#[async_trait]
impl BinaryClassifier for OnnxBinaryClassifier {
    async fn positive_probability(&self, text: &str) -> Result<f64> {
        let logits = self.model.logits(text).await?;
        let probability = abusive_probability(&logits)?;

        debug!(
            abusive_probability = probability,
            text_preview = %crate::output::truncate_chars(text, 50),
            "ONNX binary classifier scored text"
        );
        Ok(probability)
    }
}

/// How raw logits become label scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Independent per-label probabilities (multi-label models).
    Sigmoid,
    /// A distribution over mutually exclusive labels.
    Softmax,
}

/// The subset of a HuggingFace `config.json` the text classifier needs.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub problem_type: Option<String>,
}

impl ModelConfig {
    /// Labels ordered by output index. Indices must be contiguous from 0.
    pub fn labels(&self) -> Result<Vec<String>> {
        let mut indexed = self
            .id2label
            .iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|i| (i, label.clone()))
                    .with_context(|| format!("Invalid label index in id2label: {id}"))
            })
            .collect::<Result<Vec<_>>>()?;
        indexed.sort_by_key(|(i, _)| *i);

        for (expected, (i, _)) in indexed.iter().enumerate() {
            if *i != expected {
                anyhow::bail!("id2label is missing index {expected}");
            }
        }
        if indexed.is_empty() {
            anyhow::bail!("id2label is empty");
        }

        Ok(indexed.into_iter().map(|(_, label)| label).collect())
    }

    /// Matches the text-classification pipeline: sigmoid for multi-label or
    /// single-output models, softmax otherwise.
    pub fn activation(&self) -> Activation {
        if self.problem_type.as_deref() == Some("multi_label_classification")
            || self.id2label.len() == 1
        {
            Activation::Sigmoid
        } else {
            Activation::Softmax
        }
    }
}

/// Best-label text classifier (the English engine).
pub struct OnnxTextClassifier {
    model: OnnxModel,
    labels: Vec<String>,
    activation: Activation,
}

impl OnnxTextClassifier {
    /// Load the model from `model_dir`. Expects `model.onnx`, `tokenizer.json`
    /// and `config.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let config_path = model_dir.join(MODEL_CONFIG_FILE);
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: ModelConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let labels = config.labels()?;
        let activation = config.activation();
        debug!(labels = ?labels, activation = ?activation, "English classifier labels");

        Ok(Self {
            model: OnnxModel::load(model_dir, "English")?,
            labels,
            activation,
        })
    }
}

#[async_trait]
impl TextClassifier for OnnxTextClassifier {
    async fn top_label(&self, text: &str) -> Result<LabelScore> {
        let logits = self.model.logits(text).await?;
        let top = top_label(&self.labels, &logits, self.activation)?;

        debug!(
            label = %top.label,
            score = top.score,
            text_preview = %crate::output::truncate_chars(text, 50),
            "ONNX text classifier scored text"
        );
        Ok(top)
    }
}

/// Sigmoid activation: maps any real number to (0, 1).
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Softmax over a two-class output, returning the class-1 probability.
fn abusive_probability(logits: &[f32]) -> Result<f64> {
    if logits.len() != 2 {
        anyhow::bail!(
            "Binary classifier produced {} logits, expected 2",
            logits.len()
        );
    }
    Ok(softmax(logits)[1])
}

/// Activate the logits and pick the highest-scoring label.
fn top_label(labels: &[String], logits: &[f32], activation: Activation) -> Result<LabelScore> {
    if logits.len() != labels.len() {
        anyhow::bail!(
            "Classifier produced {} logits for {} labels",
            logits.len(),
            labels.len()
        );
    }

    let scores: Vec<f64> = match activation {
        Activation::Sigmoid => logits.iter().map(|&l| sigmoid(l as f64)).collect(),
        Activation::Softmax => softmax(logits),
    };

    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, &score)| LabelScore {
            label: labels[i].clone(),
            score,
        })
        .ok_or_else(|| anyhow::anyhow!("Classifier produced no scores"))
}
