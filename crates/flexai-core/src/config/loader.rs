//! Config loader — reads `~/.flexai/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.flexai/config.json`
//! 3. Environment variables `FLEXAI_<SECTION>__<FIELD>` (override JSON)
//! 4. `OPENAI_API_KEY`, only when no key was set by 1–3

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

/// Read and parse the JSON file, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `FLEXAI_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `FLEXAI_API__BASE_URL` → `api.base_url`
/// - `FLEXAI_API__API_KEY` → `api.api_key`
/// - `FLEXAI_API__TIMEOUT_SECS` → `api.timeout_secs`
/// - `FLEXAI_DEFAULTS__CHAT_MODEL` → `defaults.chat_model`
/// - `FLEXAI_DEFAULTS__SPEECH_MODEL` → `defaults.speech_model`
/// - `FLEXAI_DEFAULTS__TEMPERATURE` → `defaults.temperature`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("FLEXAI_API__BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("FLEXAI_API__API_KEY") {
        config.api.api_key = val;
    }
    if let Ok(val) = std::env::var("FLEXAI_API__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(secs) => config.api.timeout_secs = Some(secs),
            Err(_) => warn!("Ignoring invalid FLEXAI_API__TIMEOUT_SECS={}", val),
        }
    }

    if let Ok(val) = std::env::var("FLEXAI_DEFAULTS__CHAT_MODEL") {
        config.defaults.chat_model = val;
    }
    if let Ok(val) = std::env::var("FLEXAI_DEFAULTS__SPEECH_MODEL") {
        config.defaults.speech_model = val;
    }
    if let Ok(val) = std::env::var("FLEXAI_DEFAULTS__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.defaults.temperature = t;
        }
    }

    if config.api.api_key.is_empty() {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            debug!("Using OPENAI_API_KEY as fallback credential");
            config.api.api_key = val;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
