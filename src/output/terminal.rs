// Colored terminal output for moderation results.
//
// main.rs delegates here for the `check` and `detect` commands.

use colored::Colorize;

use super::truncate_chars;
use crate::language::traits::LanguageResult;
use crate::moderation::ModerationResult;

/// Display a single moderation decision.
pub fn display_result(message: &str, result: &ModerationResult) {
    println!("\n{}", "=== Moderation Result ===".bold());
    println!("  Message:  {}", truncate_chars(message, 80).dimmed());

    let verdict = if result.allowed {
        "ALLOWED".green().bold()
    } else {
        "BLOCKED".red().bold()
    };
    println!("  Verdict:  {verdict}");

    if let Some(language) = &result.language {
        println!("  Language: {language}");
    }
    if let Some(score) = result.score {
        println!("  Score:    {}", colorize_score(score));
    }
    if let Some(reason) = &result.reason {
        println!("  Reason:   {}", reason.yellow());
    }
    println!();
}

/// Display the outcome of language identification alone.
pub fn display_language(text: &str, language: &LanguageResult) {
    println!("  Text:     {}", truncate_chars(text, 80).dimmed());
    match language {
        LanguageResult::Detected(code) => println!("  Language: {}", code.bold()),
        LanguageResult::Undetected => println!("  Language: {}", "undetected".yellow()),
    }
}

fn colorize_score(score: f64) -> colored::ColoredString {
    let s = format!("{score:.4}");
    if score >= 0.9 {
        s.red().bold()
    } else if score >= 0.5 {
        s.yellow()
    } else {
        s.green()
    }
}
