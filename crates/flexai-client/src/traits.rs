//! The API surface as a trait, so consumers can hold `Arc<dyn OpenAiApi>`
//! and tests can substitute a fake.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use flexai_core::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, DeletedModel,
    ImageGenerationRequest, ImageResponse, ListResponse, Model, SpeechRequest,
    TranscriptionRequest, TranslationRequest,
};

use crate::dispatcher::StreamSummary;
use crate::error::ApiError;

/// Typed operations of an OpenAI-compatible API.
#[async_trait]
pub trait OpenAiApi: Send + Sync {
    // ── Models ──

    /// `GET models`
    async fn list_models(&self) -> Result<ListResponse<Model>, ApiError>;

    /// `GET models/{id}`
    async fn retrieve_model(&self, id: &str) -> Result<Model, ApiError>;

    /// `DELETE models/{id}`
    async fn delete_model(&self, id: &str) -> Result<DeletedModel, ApiError>;

    // ── Chat ──

    /// `POST chat/completions`, whole response at once.
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiError>;

    /// `POST chat/completions` with `stream: true`.
    ///
    /// `on_chunk` runs once per decoded chunk, in order. Undecodable frames
    /// are skipped and only counted in the returned summary.
    async fn create_streaming_chat_completion(
        &self,
        request: ChatCompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut (dyn FnMut(ChatCompletionChunk) + Send),
    ) -> Result<StreamSummary, ApiError>;

    // ── Audio ──

    /// `POST audio/speech`; returns the encoded audio.
    async fn create_speech(&self, request: SpeechRequest) -> Result<Bytes, ApiError>;

    /// `POST audio/transcriptions`; returns the transcript text.
    async fn create_transcription(&self, request: TranscriptionRequest)
        -> Result<String, ApiError>;

    /// `POST audio/translations`; returns the English text.
    async fn create_translation(&self, request: TranslationRequest) -> Result<String, ApiError>;

    // ── Images ──

    /// `POST images/generations`
    async fn create_image(&self, request: ImageGenerationRequest)
        -> Result<ImageResponse, ApiError>;

    /// `POST images/edits`
    async fn create_image_edit(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageResponse, ApiError>;

    /// `POST images/variations`
    async fn create_image_variation(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageResponse, ApiError>;
}
