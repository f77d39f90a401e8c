//! Endpoint descriptors — the wire shape of each API operation.
//!
//! A descriptor is pure data: it knows its relative path, HTTP verb,
//! optional JSON body and optional query items, and does no I/O.

use serde::Serialize;

use flexai_core::types::{
    ChatCompletionRequest, ImageGenerationRequest, SpeechRequest, TranscriptionRequest,
    TranslationRequest,
};

// ─────────────────────────────────────────────
// HTTP method
// ─────────────────────────────────────────────

/// HTTP verbs used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

// ─────────────────────────────────────────────
// Endpoint trait
// ─────────────────────────────────────────────

/// Anything the [`Dispatcher`](crate::dispatcher::Dispatcher) can execute.
pub trait Endpoint {
    /// Path relative to the base URL, without a leading slash.
    fn path(&self) -> String;

    /// HTTP verb.
    fn method(&self) -> HttpMethod;

    /// JSON-encoded request body, if the operation carries one.
    fn encode_body(&self) -> Option<serde_json::Result<Vec<u8>>>;

    /// Query parameters in order. `None` means no query string.
    fn query_items(&self) -> Option<Vec<(String, String)>> {
        None
    }
}

// ─────────────────────────────────────────────
// FlexAI endpoints
// ─────────────────────────────────────────────

/// Every operation of the API.
#[derive(Clone, Debug, PartialEq)]
pub enum FlexAiEndpoint {
    // Models
    ListModels,
    RetrieveModel { id: String },
    DeleteModel { id: String },

    // Chat
    CreateChatCompletion(ChatCompletionRequest),

    // Audio
    CreateSpeech(SpeechRequest),
    CreateTranscription(TranscriptionRequest),
    CreateTranslation(TranslationRequest),

    // Images. The three variants share a body shape; only the path differs.
    CreateImage(ImageGenerationRequest),
    CreateImageEdit(ImageGenerationRequest),
    CreateImageVariation(ImageGenerationRequest),
}

/// Borrowed view of a descriptor's payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    Chat(&'a ChatCompletionRequest),
    Speech(&'a SpeechRequest),
    Transcription(&'a TranscriptionRequest),
    Translation(&'a TranslationRequest),
    Image(&'a ImageGenerationRequest),
}

impl FlexAiEndpoint {
    /// The payload, present only for mutating operations.
    pub fn body(&self) -> Option<RequestBody<'_>> {
        match self {
            FlexAiEndpoint::ListModels
            | FlexAiEndpoint::RetrieveModel { .. }
            | FlexAiEndpoint::DeleteModel { .. } => None,
            FlexAiEndpoint::CreateChatCompletion(req) => Some(RequestBody::Chat(req)),
            FlexAiEndpoint::CreateSpeech(req) => Some(RequestBody::Speech(req)),
            FlexAiEndpoint::CreateTranscription(req) => Some(RequestBody::Transcription(req)),
            FlexAiEndpoint::CreateTranslation(req) => Some(RequestBody::Translation(req)),
            FlexAiEndpoint::CreateImage(req)
            | FlexAiEndpoint::CreateImageEdit(req)
            | FlexAiEndpoint::CreateImageVariation(req) => Some(RequestBody::Image(req)),
        }
    }
}

impl Endpoint for FlexAiEndpoint {
    fn path(&self) -> String {
        match self {
            FlexAiEndpoint::ListModels => "models".to_string(),
            FlexAiEndpoint::RetrieveModel { id } | FlexAiEndpoint::DeleteModel { id } => {
                format!("models/{id}")
            }
            FlexAiEndpoint::CreateChatCompletion(_) => "chat/completions".to_string(),
            FlexAiEndpoint::CreateSpeech(_) => "audio/speech".to_string(),
            FlexAiEndpoint::CreateTranscription(_) => "audio/transcriptions".to_string(),
            FlexAiEndpoint::CreateTranslation(_) => "audio/translations".to_string(),
            FlexAiEndpoint::CreateImage(_) => "images/generations".to_string(),
            FlexAiEndpoint::CreateImageEdit(_) => "images/edits".to_string(),
            FlexAiEndpoint::CreateImageVariation(_) => "images/variations".to_string(),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            FlexAiEndpoint::ListModels | FlexAiEndpoint::RetrieveModel { .. } => HttpMethod::Get,
            FlexAiEndpoint::DeleteModel { .. } => HttpMethod::Delete,
            FlexAiEndpoint::CreateChatCompletion(_)
            | FlexAiEndpoint::CreateSpeech(_)
            | FlexAiEndpoint::CreateTranscription(_)
            | FlexAiEndpoint::CreateTranslation(_)
            | FlexAiEndpoint::CreateImage(_)
            | FlexAiEndpoint::CreateImageEdit(_)
            | FlexAiEndpoint::CreateImageVariation(_) => HttpMethod::Post,
        }
    }

    fn encode_body(&self) -> Option<serde_json::Result<Vec<u8>>> {
        self.body().map(|body| serde_json::to_vec(&body))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
