//! `flexai speak | transcribe | translate` — audio endpoints.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use flexai_client::OpenAiApi;
use flexai_core::config::DefaultsConfig;
use flexai_core::types::{SpeechRequest, TranscriptionRequest, TranslationRequest};

use crate::helpers::expand_tilde;

/// Build a speech request, filling unset options from config defaults.
pub fn speech_request(
    defaults: &DefaultsConfig,
    text: String,
    voice: Option<String>,
    model: Option<String>,
    format: Option<String>,
) -> SpeechRequest {
    let model = model.unwrap_or_else(|| defaults.speech_model.clone());
    let voice = voice.unwrap_or_else(|| defaults.voice.clone());
    let mut request = SpeechRequest::new(model, text, voice);
    request.response_format = format;
    request
}

/// `flexai speak`: synthesize `request` and write the audio to `output`.
pub async fn speak(api: &dyn OpenAiApi, request: SpeechRequest, output: &Path) -> Result<()> {
    let output = resolve(output);
    let audio = api
        .create_speech(request)
        .await
        .context("speech request failed")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, &audio)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(bytes = audio.len(), path = %output.display(), "speech written");
    println!(
        "  {} wrote {} bytes to {}",
        "✓".green(),
        audio.len(),
        output.display()
    );
    Ok(())
}

/// `flexai transcribe`: print the transcript of an audio file.
pub async fn transcribe(
    api: &dyn OpenAiApi,
    defaults: &DefaultsConfig,
    file: &Path,
    language: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let audio = read_audio(file)?;
    let model = model.unwrap_or_else(|| defaults.transcription_model.clone());
    let mut request = TranscriptionRequest::new(audio, model);
    request.language = language;

    let text = api
        .create_transcription(request)
        .await
        .context("transcription request failed")?;
    println!("{text}");
    Ok(())
}

/// `flexai translate`: print the English translation of an audio file.
pub async fn translate(
    api: &dyn OpenAiApi,
    defaults: &DefaultsConfig,
    file: &Path,
    model: Option<String>,
) -> Result<()> {
    let audio = read_audio(file)?;
    let model = model.unwrap_or_else(|| defaults.transcription_model.clone());

    let text = api
        .create_translation(TranslationRequest::new(audio, model))
        .await
        .context("translation request failed")?;
    println!("{text}");
    Ok(())
}

fn resolve(path: &Path) -> PathBuf {
    expand_tilde(&path.to_string_lossy())
}

fn read_audio(file: &Path) -> Result<Vec<u8>> {
    let path = resolve(file);
    let audio =
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    if audio.is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(audio)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
