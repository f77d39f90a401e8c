//! Core building blocks shared by the FlexAI client and CLI.
//!
//! - [`types`] — request/response payloads of the OpenAI-compatible API
//! - [`config`] — `~/.flexai/config.json` schema, loader, env overrides
//! - [`utils`] — data directory and small formatting helpers

pub mod config;
pub mod types;
pub mod utils;
