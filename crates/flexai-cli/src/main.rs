//! FlexAI CLI — entry point.
//!
//! # Commands
//!
//! - `flexai chat [-m MESSAGE]` — chat (single-shot or REPL), streamed by default
//! - `flexai models list|show|delete` — model management
//! - `flexai speak | transcribe | translate` — audio endpoints
//! - `flexai image PROMPT` — image generation, edit, variation
//! - `flexai onboard` — write a starter config
//! - `flexai status` — show configuration

mod audio_cmd;
mod chat;
mod helpers;
mod image_cmd;
mod models_cmd;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use flexai_client::{Conversation, FlexAiClient};
use flexai_core::config::{load_config, Config};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// FlexAI: client for OpenAI-compatible APIs
#[derive(Parser)]
#[command(name = "flexai", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with a model (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Model to use (defaults to `defaults.chatModel`)
        #[arg(long)]
        model: Option<String>,

        /// System prompt to start the conversation with
        #[arg(short, long)]
        system: Option<String>,

        /// Wait for the whole answer instead of streaming it
        #[arg(long, default_value_t = false)]
        no_stream: bool,
    },

    /// List, inspect or delete models
    Models {
        #[command(subcommand)]
        action: models_cmd::ModelsCommands,
    },

    /// Turn text into speech
    Speak {
        /// Text to speak
        text: String,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Voice (defaults to `defaults.voice`)
        #[arg(long)]
        voice: Option<String>,

        /// Model (defaults to `defaults.speechModel`)
        #[arg(long)]
        model: Option<String>,

        /// Audio format, e.g. mp3, opus, wav
        #[arg(long)]
        format: Option<String>,
    },

    /// Transcribe an audio file
    Transcribe {
        /// Audio file
        file: PathBuf,

        /// Spoken language (ISO-639-1)
        #[arg(short, long)]
        language: Option<String>,

        /// Model (defaults to `defaults.transcriptionModel`)
        #[arg(long)]
        model: Option<String>,
    },

    /// Translate an audio file into English text
    Translate {
        /// Audio file
        file: PathBuf,

        /// Model (defaults to `defaults.transcriptionModel`)
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate, edit or vary images
    Image(image_cmd::ImageArgs),

    /// Write a starter configuration
    Onboard {
        /// Base URL of the API
        #[arg(long)]
        base_url: Option<String>,

        /// API key to store
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Onboard { base_url, api_key } => onboard::run(base_url, api_key),
        Commands::Status => status::run(),
        command => run_api_command(command).await,
    }
}

/// Run a command that talks to the API.
async fn run_api_command(command: Commands) -> Result<()> {
    let config = load_config(None);
    let client = build_client(&config)?;

    match command {
        Commands::Chat {
            message,
            model,
            system,
            no_stream,
        } => {
            let conversation = build_conversation(&config, model, system);
            run_chat(&client, conversation, message, !no_stream).await
        }
        Commands::Models { action } => models_cmd::dispatch(&client, action).await,
        Commands::Speak {
            text,
            output,
            voice,
            model,
            format,
        } => {
            let request = audio_cmd::speech_request(&config.defaults, text, voice, model, format);
            audio_cmd::speak(&client, request, &output).await
        }
        Commands::Transcribe {
            file,
            language,
            model,
        } => audio_cmd::transcribe(&client, &config.defaults, &file, language, model).await,
        Commands::Translate { file, model } => {
            audio_cmd::translate(&client, &config.defaults, &file, model).await
        }
        Commands::Image(args) => image_cmd::run(&client, &config.defaults, args).await,
        Commands::Onboard { .. } | Commands::Status => Ok(()),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    client: &FlexAiClient,
    mut conversation: Conversation,
    message: Option<String>,
    stream: bool,
) -> Result<()> {
    match message {
        Some(msg) => {
            // Single-shot mode
            info!(model = conversation.model(), stream, "sending single message");
            if !stream {
                helpers::print_thinking();
            }
            let reply = chat::ask(client, &mut conversation, &msg, stream).await;
            if !stream {
                helpers::clear_thinking();
            }
            let reply = reply.context("chat request failed")?;
            if !stream {
                helpers::print_response(&reply);
            }
        }
        None => {
            // Interactive REPL mode
            repl::run(client, conversation, stream).await?;
        }
    }

    Ok(())
}

/// Start a conversation from config defaults and command-line overrides.
fn build_conversation(config: &Config, model: Option<String>, system: Option<String>) -> Conversation {
    let model = model.unwrap_or_else(|| config.defaults.chat_model.clone());
    let conversation = Conversation::new(model).with_temperature(config.defaults.temperature);
    match system {
        Some(prompt) => conversation.with_system(prompt),
        None => conversation,
    }
}

/// Build a client from the loaded configuration.
pub fn build_client(config: &Config) -> Result<FlexAiClient> {
    if !config.api.is_configured() {
        anyhow::bail!(
            "No API key configured. Set FLEXAI_API__API_KEY or OPENAI_API_KEY, \
             or run `flexai onboard --api-key ...`."
        );
    }
    FlexAiClient::from_config(&config.api).context("failed to create HTTP client")
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("flexai=debug,flexai_client=debug,flexai_core=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
