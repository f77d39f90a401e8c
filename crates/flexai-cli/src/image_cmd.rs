//! `flexai image` — image generation, edits and variations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Args, ValueEnum};
use colored::Colorize;

use flexai_client::OpenAiApi;
use flexai_core::config::DefaultsConfig;
use flexai_core::types::{ImageGenerationRequest, ImageResponse};
use flexai_core::utils::format_unix_date;

use crate::helpers::expand_tilde;

/// Which image endpoint to call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ImageMode {
    #[default]
    Generate,
    Edit,
    Variation,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Text description of the image
    pub prompt: String,

    /// Endpoint to use
    #[arg(long, value_enum, default_value_t = ImageMode::Generate)]
    pub mode: ImageMode,

    /// Model (defaults to `defaults.imageModel`)
    #[arg(long)]
    pub model: Option<String>,

    /// Number of images
    #[arg(short, long)]
    pub n: Option<u32>,

    /// Image size, e.g. 1024x1024
    #[arg(long)]
    pub size: Option<String>,

    /// Quality, e.g. standard or hd
    #[arg(long)]
    pub quality: Option<String>,

    /// Style, e.g. vivid or natural
    #[arg(long)]
    pub style: Option<String>,

    /// Request inline image data and save it into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl ImageArgs {
    /// Request body, with unset options filled from config defaults.
    pub fn to_request(&self, defaults: &DefaultsConfig) -> ImageGenerationRequest {
        ImageGenerationRequest {
            prompt: self.prompt.clone(),
            model: Some(
                self.model
                    .clone()
                    .unwrap_or_else(|| defaults.image_model.clone()),
            ),
            n: self.n,
            quality: self.quality.clone(),
            size: self.size.clone(),
            style: self.style.clone(),
            response_format: self.output_dir.as_ref().map(|_| "b64_json".to_string()),
            user: None,
        }
    }
}

/// Run an image command and report what came back.
pub async fn run(api: &dyn OpenAiApi, defaults: &DefaultsConfig, args: ImageArgs) -> Result<()> {
    let request = args.to_request(defaults);
    let response = match args.mode {
        ImageMode::Generate => api.create_image(request).await,
        ImageMode::Edit => api.create_image_edit(request).await,
        ImageMode::Variation => api.create_image_variation(request).await,
    }
    .context("image request failed")?;

    let saved = match &args.output_dir {
        Some(dir) => save_images(&response, &expand_tilde(&dir.to_string_lossy()))?,
        None => Vec::new(),
    };
    print_images(&response, &saved);
    Ok(())
}

/// Decode inline images into `dir` as `image-<created>-<n>.png`.
fn save_images(response: &ImageResponse, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut saved = Vec::new();
    for (i, image) in response.data.iter().enumerate() {
        let Some(encoded) = &image.b64_json else {
            continue;
        };
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .with_context(|| format!("image {} is not valid base64", i + 1))?;
        let path = dir.join(format!("image-{}-{}.png", response.created, i + 1));
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        saved.push(path);
    }
    Ok(saved)
}

fn print_images(response: &ImageResponse, saved: &[PathBuf]) {
    println!();
    println!(
        "  {} {} image(s), created {}",
        "✓".green(),
        response.data.len(),
        format_unix_date(response.created)
    );
    for (i, image) in response.data.iter().enumerate() {
        println!();
        if let Some(url) = &image.url {
            println!("  {} {}", format!("[{}]", i + 1).bold(), url);
        } else if image.b64_json.is_some() {
            println!("  {} {}", format!("[{}]", i + 1).bold(), "(inline data)".dimmed());
        }
        if let Some(revised) = &image.revised_prompt {
            println!("      {}", revised.dimmed());
        }
    }
    for path in saved {
        println!("  {} saved {}", "✓".green(), path.display());
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
