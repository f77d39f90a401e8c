//! Configuration schema.
//!
//! Hierarchy: `Config` → `ApiConfig`, `DefaultsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://localhost/v1";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.flexai/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: DefaultsConfig,
}

// ─────────────────────────────────────────────
// API endpoint
// ─────────────────────────────────────────────

/// Where to send requests and how to authenticate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto (e.g. `"https://api.openai.com/v1"`).
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Transport-level request deadline. `None` leaves the HTTP client default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Whether an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────

/// Default models and parameters used when a command doesn't specify them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultsConfig {
    pub chat_model: String,
    pub speech_model: String,
    pub transcription_model: String,
    pub image_model: String,
    /// Voice for text-to-speech.
    pub voice: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-3.5-turbo".to_string(),
            speech_model: "tts-1".to_string(),
            transcription_model: "whisper-1".to_string(),
            image_model: "dall-e-3".to_string(),
            voice: "alloy".to_string(),
            temperature: 0.7,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://localhost/v1");
        assert!(!config.api.is_configured());
        assert_eq!(config.defaults.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.defaults.speech_model, "tts-1");
        assert_eq!(config.defaults.temperature, 0.7);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api": {"apiKey": "sk-1"}, "defaults": {"chatModel": "gpt-4o"}}"#,
        )
        .unwrap();
        assert!(config.api.is_configured());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.defaults.chat_model, "gpt-4o");
        assert_eq!(config.defaults.voice, "alloy");
    }

    #[test]
    fn test_timeout_omitted_when_unset() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["api"].get("timeoutSecs").is_none());
        assert!(json["api"].get("baseUrl").is_some());
    }
}
