//! Error taxonomy of the dispatch layer.

use bytes::Bytes;

/// Everything that can go wrong while executing one descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Base URL, path or query could not be combined into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A response arrived but could not be read as a complete body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Non-2xx status. `body` is kept verbatim and never parsed.
    ///
    /// If the error body itself cannot be read, the failure surfaces as
    /// [`ApiError::Transport`] instead.
    #[error("HTTP {status}: {}", String::from_utf8_lossy(.body))]
    Http { status: u16, body: Bytes },

    /// Request payload could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// 2xx body could not be parsed into the expected type.
    #[error("failed to decode response body: {0}")]
    Decoding(String),

    /// Connection-level failure, passed through from the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Status code of an [`ApiError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw error body rendered as text, for diagnostics.
    pub fn body_text(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => Some(String::from_utf8_lossy(body).into_owned()),
            _ => None,
        }
    }
}
