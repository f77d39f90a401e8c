//! `flexai onboard` — write or update `~/.flexai/config.json`.
//!
//! - Creates the config with defaults when it doesn't exist
//! - Stores `--base-url` / `--api-key` when given
//! - Creates the REPL history directory

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use flexai_core::config::{get_config_path, save_config, Config};
use flexai_core::utils::{get_history_path, mask_secret};

/// What happened to the config file.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Created,
    Updated,
    Unchanged,
}

/// Run the onboard command.
pub fn run(base_url: Option<String>, api_key: Option<String>) -> Result<()> {
    println!();
    println!("{}", "FlexAI Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let (outcome, config) = write_config(&config_path, base_url, api_key)?;
    let verb = match outcome {
        Outcome::Created => "created config at",
        Outcome::Updated => "updated config at",
        Outcome::Unchanged => "config already exists at",
    };
    println!("  {} {} {}", "✓".green(), verb, config_path.display());
    println!("  {} base URL {}", "✓".green(), config.api.base_url);
    if config.api.is_configured() {
        println!("  {} API key {}", "✓".green(), mask_secret(&config.api.api_key));
    } else {
        println!(
            "  {} no API key stored (set OPENAI_API_KEY or pass --api-key)",
            "·".yellow()
        );
    }

    let history_dir = get_history_path();
    std::fs::create_dir_all(&history_dir)?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    println!();
    println!(
        "{}",
        "  Setup complete! Run `flexai chat` to start chatting.".green()
    );
    println!();

    Ok(())
}

/// Create or update the config file at `path`.
///
/// An existing file is parsed as-is (no env overrides), so only the given
/// fields change. A file that doesn't parse is left alone and reported.
fn write_config(
    path: &Path,
    base_url: Option<String>,
    api_key: Option<String>,
) -> Result<(Outcome, Config)> {
    let existing = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid config JSON", path.display()))?;
        Some(config)
    } else {
        None
    };

    let created = existing.is_none();
    let mut config = existing.unwrap_or_default();
    let mut changed = created;

    if let Some(url) = base_url {
        config.api.base_url = url;
        changed = true;
    }
    if let Some(key) = api_key {
        config.api.api_key = key;
        changed = true;
    }

    if !changed {
        return Ok((Outcome::Unchanged, config));
    }
    save_config(&config, Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;

    let outcome = if created {
        Outcome::Created
    } else {
        Outcome::Updated
    };
    Ok((outcome, config))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
