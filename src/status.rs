// System status display: model files, thresholds, and server address.

use colored::Colorize;

use crate::config::Config;
use crate::toxicity::download::{
    english_files_present, english_model_dir, hindi_files_present, hindi_model_dir,
};

/// Display system status to the terminal.
pub fn show(config: &Config) {
    println!("Model directory: {}", config.model_dir.display());

    print_model(
        "Hindi model",
        hindi_files_present(&config.model_dir),
        &hindi_model_dir(&config.model_dir).display().to_string(),
    );
    print_model(
        "English model",
        english_files_present(&config.model_dir),
        &english_model_dir(&config.model_dir).display().to_string(),
    );

    println!(
        "Thresholds: hi >= {:.2} (abusive probability), en >= {:.2} (toxic label)",
        config.hindi_threshold, config.english_threshold
    );
    if config.min_language_confidence > 0.0 {
        println!(
            "Language detection: minimum confidence {:.2}",
            config.min_language_confidence
        );
    }
    println!("Server address: http://{}:{}", config.bind, config.port);

    if !crate::toxicity::download::model_files_present(&config.model_dir) {
        println!(
            "\n{}",
            "Run `parley download-model` before `parley serve`.".dimmed()
        );
    }
}

fn print_model(name: &str, present: bool, dir: &str) {
    if present {
        println!("{name}: {} ({dir})", "ready".green());
    } else {
        println!("{name}: {} ({dir})", "missing".red());
    }
}
