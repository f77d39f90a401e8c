//! Client SDK for OpenAI-compatible HTTP APIs.
//!
//! # Architecture
//!
//! - [`endpoint::FlexAiEndpoint`] — closed set of API operations, each mapped to path/method/body
//! - [`session::SessionContext`] — immutable base URL + bearer credential
//! - [`dispatcher::Dispatcher`] — sends one descriptor, decodes one value or a stream of frames
//! - [`sse`] — `data: ` line framing for streamed bodies
//! - [`client::FlexAiClient`] — typed operations, via the [`traits::OpenAiApi`] trait
//! - [`conversation::Conversation`] — running chat history that folds in responses and deltas

pub mod client;
pub mod conversation;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod session;
pub mod sse;
pub mod traits;

#[cfg(test)]
mod test_server;

// Re-export main types for convenience
pub use client::FlexAiClient;
pub use conversation::Conversation;
pub use dispatcher::{http_client_builder, Dispatcher, StreamSummary};
pub use endpoint::{Endpoint, FlexAiEndpoint, HttpMethod, RequestBody};
pub use error::ApiError;
pub use session::SessionContext;
pub use traits::OpenAiApi;
pub use tokio_util::sync::CancellationToken;
