//! Utility helpers — path resolution, timestamp and string formatting.

use std::path::PathBuf;

/// Get the FlexAI data directory (e.g. `~/.flexai/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".flexai")
}

/// Get the REPL history directory (e.g. `~/.flexai/history/`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Render a Unix timestamp as `YYYY-MM-DD`. Zero or out-of-range values render as `-`.
pub fn format_unix_date(secs: i64) -> String {
    if secs <= 0 {
        return "-".to_string();
    }
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Hide all but the last four characters of a credential.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
