//! Interactive chat REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use flexai_client::{Conversation, OpenAiApi};
use flexai_core::utils::get_history_path;

use crate::{chat, helpers};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What a line of input asks the REPL to do.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Empty,
    Exit,
    Clear,
    Model(Option<&'a str>),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if is_exit_command(trimmed) {
        return Input::Exit;
    }
    if trimmed.eq_ignore_ascii_case("/clear") {
        return Input::Clear;
    }
    if let Some(rest) = trimmed.strip_prefix("/model") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            let name = rest.trim();
            return Input::Model((!name.is_empty()).then_some(name));
        }
    }
    Input::Message(trimmed)
}

/// Run the interactive REPL loop.
pub async fn run(api: &dyn OpenAiApi, mut conversation: Conversation, stream: bool) -> Result<()> {
    helpers::print_banner(conversation.model());

    let mut editor = create_editor()?;

    loop {
        // Read input
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C at the prompt
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            Input::Clear => {
                conversation.clear();
                println!("{}", "  conversation cleared".dimmed());
                continue;
            }
            Input::Model(None) => {
                println!("  model: {}", conversation.model());
                continue;
            }
            Input::Model(Some(name)) => {
                conversation.set_model(name);
                println!("{}", format!("  switched to {name}").dimmed());
                continue;
            }
            Input::Message(message) => {
                let _ = editor.add_history_entry(line.as_str());

                debug!(
                    model = conversation.model(),
                    turns = conversation.messages().len(),
                    "sending message"
                );
                if !stream {
                    helpers::print_thinking();
                }
                let result = chat::ask(api, &mut conversation, message, stream).await;
                if !stream {
                    helpers::clear_thinking();
                }

                match result {
                    Ok(reply) if !stream => helpers::print_response(&reply),
                    Ok(_) => {}
                    Err(e) => eprintln!("\n❌ Error: {e:#}\n"),
                }
            }
        }
    }

    // Save history
    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    get_history_path().join("chat_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
