// Model download helper for the ONNX classifiers.
//
// Downloads two models from HuggingFace-style repositories:
// 1. hindi-abusive-MuRIL: binary abusive/non-abusive classifier for Hindi
// 2. toxic-bert: multi-label toxicity classifier for English
//
// Each model lands in its own subdirectory of the model dir
// (~/.local/share/parley/models/ on Linux by default) so they persist across
// runs. The base URLs are configurable because the upstream repositories may
// need an ONNX export hosted elsewhere.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Default base URL for the Hindi model repository.
pub const DEFAULT_HINDI_MODEL_URL: &str =
    "https://huggingface.co/Hate-speech-CNERG/hindi-abusive-MuRIL/resolve/main";

/// Default base URL for the English model repository.
pub const DEFAULT_ENGLISH_MODEL_URL: &str = "https://huggingface.co/unitary/toxic-bert/resolve/main";

/// Local file names inside each model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const MODEL_CONFIG_FILE: &str = "config.json";

/// Remote path of the ONNX export inside a repository (optimum layout).
const REMOTE_MODEL_FILE: &str = "onnx/model.onnx";

/// Subdirectory names for each model.
const HINDI_MODEL_SUBDIR: &str = "hindi-abusive-muril";
const ENGLISH_MODEL_SUBDIR: &str = "toxic-bert";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/parley/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parley")
        .join("models")
}

/// Subdirectory within model_dir for the Hindi model.
pub fn hindi_model_dir(base: &Path) -> PathBuf {
    base.join(HINDI_MODEL_SUBDIR)
}

/// Subdirectory within model_dir for the English model.
pub fn english_model_dir(base: &Path) -> PathBuf {
    base.join(ENGLISH_MODEL_SUBDIR)
}

/// Check whether the Hindi model files exist.
pub fn hindi_files_present(base: &Path) -> bool {
    let dir = hindi_model_dir(base);
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

/// Check whether the English model files exist (including its label config).
pub fn english_files_present(base: &Path) -> bool {
    let dir = english_model_dir(base);
    dir.join(MODEL_FILE).exists()
        && dir.join(TOKENIZER_FILE).exists()
        && dir.join(MODEL_CONFIG_FILE).exists()
}

/// Check whether every model the service needs is on disk.
pub fn model_files_present(base: &Path) -> bool {
    hindi_files_present(base) && english_files_present(base)
}

/// One file to fetch: remote path inside the repo, local name, and whether
/// it's big enough to deserve a progress bar.
struct RemoteFile {
    remote: &'static str,
    local: &'static str,
    large: bool,
}

const HINDI_FILES: [RemoteFile; 2] = [
    RemoteFile {
        remote: TOKENIZER_FILE,
        local: TOKENIZER_FILE,
        large: false,
    },
    RemoteFile {
        remote: REMOTE_MODEL_FILE,
        local: MODEL_FILE,
        large: true,
    },
];

const ENGLISH_FILES: [RemoteFile; 3] = [
    RemoteFile {
        remote: MODEL_CONFIG_FILE,
        local: MODEL_CONFIG_FILE,
        large: false,
    },
    RemoteFile {
        remote: TOKENIZER_FILE,
        local: TOKENIZER_FILE,
        large: false,
    },
    RemoteFile {
        remote: REMOTE_MODEL_FILE,
        local: MODEL_FILE,
        large: true,
    },
];

/// Download both ONNX models.
///
/// Shows progress bars for large files. Skips files that already exist.
/// Creates directories as needed.
pub async fn download_models(base: &Path, hindi_url: &str, english_url: &str) -> Result<()> {
    println!("\nHindi model (hindi-abusive-MuRIL):");
    download_repo(hindi_url, &hindi_model_dir(base), &HINDI_FILES).await?;

    println!("\nEnglish model (toxic-bert):");
    download_repo(english_url, &english_model_dir(base), &ENGLISH_FILES).await?;

    Ok(())
}

async fn download_repo(base_url: &str, dir: &Path, files: &[RemoteFile]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    for file in files {
        let dest = dir.join(file.local);
        if dest.exists() {
            info!(file = file.local, dir = %dir.display(), "Model file already exists, skipping");
            println!("  {} (already exists)", file.local);
            continue;
        }

        println!("  Downloading {}...", file.local);
        download_file(&file_url(base_url, file.remote), &dest, file.large).await?;
    }

    Ok(())
}

/// Join a repository base URL and a path inside it.
fn file_url(base_url: &str, remote: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), remote)
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let total_size = response.content_length();

    let pb = if show_progress {
        let pb = match total_size {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .context("Invalid progress bar template")?
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("    {spinner} {bytes}")
                        .context("Invalid progress spinner template")?,
                );
                pb
            }
        };
        Some(pb)
    } else {
        None
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}
