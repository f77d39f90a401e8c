//! `flexai status` — show where requests go and which defaults apply.

use anyhow::Result;
use colored::Colorize;

use flexai_core::config::{get_config_path, load_config, Config};
use flexai_core::utils::{get_history_path, mask_secret};

use crate::helpers::print_field;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "FlexAI Status".cyan().bold());
    println!();

    print_field(
        "Config:",
        format!("{} {}", config_path.display(), exists_mark(config_path.exists())),
    );
    let history = get_history_path();
    print_field(
        "History:",
        format!("{} {}", history.display(), exists_mark(history.exists())),
    );

    println!();
    print_field("Base URL:", &config.api.base_url);
    print_field("API key:", key_status(&config));
    if let Some(secs) = config.api.timeout_secs {
        print_field("Timeout:", format!("{secs}s"));
    }

    println!();
    println!("  {}", "Defaults:".bold());
    print_field("  chat:", &config.defaults.chat_model);
    print_field(
        "  temperature:",
        format!("{}", config.defaults.temperature).dimmed(),
    );
    print_field("  speech:", format!("{} ({})", config.defaults.speech_model, config.defaults.voice));
    print_field("  transcription:", &config.defaults.transcription_model);
    print_field("  image:", &config.defaults.image_model);
    println!();

    Ok(())
}

fn exists_mark(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn key_status(config: &Config) -> String {
    if config.api.is_configured() {
        format!("{} {}", "✓".green(), mask_secret(&config.api.api_key))
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
