//! Shared CLI helpers — path expansion, response printing, version banner.

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a complete assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "FlexAI".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the label that precedes a streamed reply.
pub fn print_stream_header() {
    println!();
    println!("{}", "FlexAI".cyan().bold());
}

/// Print one streamed delta and flush so it shows up immediately.
pub fn print_delta(delta: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(delta.as_bytes());
    let _ = stdout.flush();
}

/// Terminate a streamed reply.
pub fn finish_stream(received_any: bool, cancelled: bool) {
    if !received_any {
        print!("{}", "(no response)".dimmed());
    }
    if cancelled {
        print!(" {}", "[cancelled]".yellow());
    }
    println!();
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "FlexAI".cyan().bold(), version.dimmed());
    println!("{}", format!("model: {model}").dimmed());
    println!(
        "{}",
        "Type a message, \"/clear\" to reset, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-streaming mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Print a labelled value, the way `status` and `models show` lay out fields.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<18} {}", label.bold(), value);
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
