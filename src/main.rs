use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use parley::config::Config;
use parley::language::detect::WhatlangIdentifier;
use parley::language::traits::identify_fail_open;
use parley::moderation::{Moderator, OracleSet, Route};
use parley::toxicity::download;
use parley::toxicity::onnx::{OnnxBinaryClassifier, OnnxTextClassifier};
use parley::toxicity::oracle::{EnglishToxicityOracle, HindiAbuseOracle};

/// Parley: language-aware toxicity moderation for chat messages.
///
/// Routes each message to a Hindi or English toxicity model based on its
/// detected language and returns an allow/block decision.
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation HTTP API
    Serve {
        /// Port to listen on (default: PARLEY_PORT or 5001)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: PARLEY_BIND or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Moderate a single message and print the decision
    Check {
        /// The message text
        message: String,

        /// Print the result as JSON, exactly as the API returns it
        #[arg(long)]
        json: bool,
    },

    /// Identify the language of a text without classifying it
    Detect {
        /// The text to identify
        text: String,
    },

    /// Download the Hindi and English ONNX models
    DownloadModel,

    /// Show model and configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("parley=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_models()?;

            let moderator = create_moderator(&config)?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());

            parley::web::run_server(moderator, port, &bind).await?;
        }

        Commands::Check { message, json } => {
            let config = Config::load()?;
            config.require_models()?;

            let moderator = create_moderator(&config)?;
            let result = moderator.evaluate(&message).await?;

            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                parley::output::terminal::display_result(&message, &result);
            }
        }

        Commands::Detect { text } => {
            let config = Config::load()?;
            let identifier = WhatlangIdentifier::new(config.min_language_confidence);
            // Detection alone never needs the classifiers
            let language = identify_fail_open(&identifier, &text);
            parley::output::terminal::display_language(&text, &language);
        }

        Commands::DownloadModel => {
            let config = Config::load()?;

            println!("Downloading ONNX models...");
            println!("  Destination: {}", config.model_dir.display());

            download::download_models(
                &config.model_dir,
                &config.hindi_model_url,
                &config.english_model_url,
            )
            .await?;

            println!("\n{}", "Models downloaded successfully.".bold());
            println!("You can now run `parley serve` or `parley check \"some message\"`.");
        }

        Commands::Status => {
            let config = Config::load()?;
            parley::status::show(&config);
        }
    }

    Ok(())
}

/// Load both classifiers and wire them into a Moderator.
///
/// This is the only place models are loaded; the result is shared by every
/// request for the life of the process.
fn create_moderator(config: &Config) -> Result<Moderator> {
    info!("Loading Hindi classifier");
    let hindi = OnnxBinaryClassifier::load(&download::hindi_model_dir(&config.model_dir))?;

    info!("Loading English classifier");
    let english = OnnxTextClassifier::load(&download::english_model_dir(&config.model_dir))?;

    let oracles = OracleSet::new(
        Arc::new(HindiAbuseOracle::new(Arc::new(hindi), config.hindi_threshold)),
        Arc::new(EnglishToxicityOracle::new(
            Arc::new(english),
            config.english_threshold,
        )),
    );

    info!(
        hindi_threshold = oracles.oracle(Route::Hindi).threshold(),
        english_threshold = oracles.oracle(Route::English).threshold(),
        "Moderation models ready"
    );

    Ok(Moderator::new(
        Arc::new(WhatlangIdentifier::new(config.min_language_confidence)),
        oracles,
    ))
}
