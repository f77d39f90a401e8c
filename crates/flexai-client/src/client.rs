//! `FlexAiClient` — typed operations over the [`Dispatcher`].
//!
//! Each operation picks its [`FlexAiEndpoint`] variant and the decode mode
//! the response needs (JSON, raw bytes, text). Nothing else happens here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use flexai_core::config::ApiConfig;
use flexai_core::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, DeletedModel,
    ImageGenerationRequest, ImageResponse, ListResponse, Model, SpeechRequest,
    TranscriptionRequest, TranslationRequest,
};

use crate::dispatcher::{http_client_builder, Dispatcher, StreamSummary};
use crate::endpoint::FlexAiEndpoint;
use crate::error::ApiError;
use crate::session::SessionContext;
use crate::traits::OpenAiApi;

/// Client for one base URL + credential pair.
#[derive(Clone, Debug)]
pub struct FlexAiClient {
    dispatcher: Dispatcher,
}

impl FlexAiClient {
    /// Create a client with the default HTTP settings from [`http_client_builder`].
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let http = http_client_builder().build()?;
        Ok(Self::with_http_client(SessionContext::new(base_url, api_key), http))
    }

    /// Create a client around an existing HTTP client (connection pool, proxy, timeouts).
    ///
    /// The client is used as given; start from [`http_client_builder`] to keep
    /// 3xx responses as [`ApiError::Http`] instead of following them.
    pub fn with_http_client(session: SessionContext, http: reqwest::Client) -> Self {
        Self {
            dispatcher: Dispatcher::new(http, Arc::new(session)),
        }
    }

    /// Build from the `api` section of the config file.
    ///
    /// `timeout_secs` bounds connecting and each wait for more body data,
    /// not the whole exchange, so a stream that keeps producing frames is
    /// never cut off.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = http_client_builder();
        if let Some(secs) = config.timeout_secs {
            let timeout = Duration::from_secs(secs);
            builder = builder.connect_timeout(timeout).read_timeout(timeout);
        }
        let http = builder.build()?;

        debug!(
            base_url = %config.base_url,
            timeout_secs = ?config.timeout_secs,
            "Creating FlexAI client"
        );

        Ok(Self::with_http_client(
            SessionContext::new(config.base_url.clone(), config.api_key.clone()),
            http,
        ))
    }

    pub fn session(&self) -> &SessionContext {
        self.dispatcher.session()
    }

    /// Low-level access for endpoints or decode modes the typed API doesn't cover.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Pull the transcript out of a transcription/translation body.
///
/// `text`/`srt`/`vtt` formats come back as plain text; the `json` formats
/// wrap it as `{"text": ...}`.
fn extract_transcript(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(map)) => match map.get("text") {
            Some(serde_json::Value::String(text)) => text.clone(),
            _ => body,
        },
        _ => body,
    }
}

#[async_trait]
impl OpenAiApi for FlexAiClient {
    async fn list_models(&self) -> Result<ListResponse<Model>, ApiError> {
        self.dispatcher.send(&FlexAiEndpoint::ListModels).await
    }

    async fn retrieve_model(&self, id: &str) -> Result<Model, ApiError> {
        self.dispatcher
            .send(&FlexAiEndpoint::RetrieveModel { id: id.to_string() })
            .await
    }

    async fn delete_model(&self, id: &str) -> Result<DeletedModel, ApiError> {
        self.dispatcher
            .send(&FlexAiEndpoint::DeleteModel { id: id.to_string() })
            .await
    }

    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Creating chat completion"
        );
        self.dispatcher
            .send(&FlexAiEndpoint::CreateChatCompletion(request))
            .await
    }

    async fn create_streaming_chat_completion(
        &self,
        request: ChatCompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut (dyn FnMut(ChatCompletionChunk) + Send),
    ) -> Result<StreamSummary, ApiError> {
        let request = request.with_stream(true);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Streaming chat completion"
        );
        self.dispatcher
            .stream_with_cancel(
                &FlexAiEndpoint::CreateChatCompletion(request),
                cancel,
                |chunk: ChatCompletionChunk| on_chunk(chunk),
            )
            .await
    }

    async fn create_speech(&self, request: SpeechRequest) -> Result<Bytes, ApiError> {
        self.dispatcher
            .send_bytes(&FlexAiEndpoint::CreateSpeech(request))
            .await
    }

    async fn create_transcription(
        &self,
        request: TranscriptionRequest,
    ) -> Result<String, ApiError> {
        self.dispatcher
            .send_text(&FlexAiEndpoint::CreateTranscription(request))
            .await
            .map(extract_transcript)
    }

    async fn create_translation(&self, request: TranslationRequest) -> Result<String, ApiError> {
        self.dispatcher
            .send_text(&FlexAiEndpoint::CreateTranslation(request))
            .await
            .map(extract_transcript)
    }

    async fn create_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageResponse, ApiError> {
        self.dispatcher
            .send(&FlexAiEndpoint::CreateImage(request))
            .await
    }

    async fn create_image_edit(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageResponse, ApiError> {
        self.dispatcher
            .send(&FlexAiEndpoint::CreateImageEdit(request))
            .await
    }

    async fn create_image_variation(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageResponse, ApiError> {
        self.dispatcher
            .send(&FlexAiEndpoint::CreateImageVariation(request))
            .await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{data_line, scripted_server, SSE_HEAD};
    use flexai_core::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_request() -> ChatCompletionRequest {
        ChatCompletionRequest::new("gpt-4", vec![ChatMessage::user("Hello")]).with_temperature(0.7)
    }

    // ── Unit tests ──

    #[test]
    fn test_extract_transcript_plain_text() {
        assert_eq!(extract_transcript("hello world".into()), "hello world");
        assert_eq!(extract_transcript("42".into()), "42");
    }

    #[test]
    fn test_extract_transcript_json() {
        assert_eq!(
            extract_transcript(r#"{"text":"hello world","language":"en"}"#.into()),
            "hello world"
        );
        // Objects without a text field are returned untouched.
        assert_eq!(extract_transcript(r#"{"foo":1}"#.into()), r#"{"foo":1}"#);
    }

    #[test]
    fn test_from_config() {
        let config = ApiConfig {
            base_url: "https://api.test.com/v1".into(),
            api_key: "test-key".into(),
            timeout_secs: Some(10),
        };
        let client = FlexAiClient::from_config(&config).unwrap();
        assert_eq!(client.session().base_url(), "https://api.test.com/v1");
        assert_eq!(client.session().api_key(), "test-key");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_list_models() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "gpt-4", "object": "model", "created": 1687882411, "owned_by": "openai"},
                    {"id": "tts-1", "object": "model", "owned_by": "openai-internal"}
                ],
                "has_more": true,
                "first_id": "gpt-4",
                "last_id": "tts-1"
            })))
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let list = client.list_models().await.unwrap();

        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].created, 1687882411);
        assert!(list.has_more);
        assert_eq!(list.first_id.as_deref(), Some("gpt-4"));
        assert_eq!(list.last_id.as_deref(), Some("tts-1"));
    }

    #[tokio::test]
    async fn test_retrieve_and_delete_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models/gpt-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gpt-4", "object": "model", "owned_by": "openai"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/models/ft-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ft-123", "object": "model", "deleted": true
            })))
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        assert_eq!(client.retrieve_model("gpt-4").await.unwrap().owned_by, "openai");
        assert!(client.delete_model("ft-123").await.unwrap().deleted);
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4",
                "temperature": 0.7,
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi!"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
            })))
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let resp = client.create_chat_completion(chat_request()).await.unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(resp.first_content(), Some("Hi!"));
        assert_eq!(resp.usage.unwrap().total_tokens, 4);
    }

    #[tokio::test]
    async fn test_chat_completion_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error":"rate_limited"}"#))
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let err = client.create_chat_completion(chat_request()).await.unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(err.body_text().as_deref(), Some(r#"{"error":"rate_limited"}"#));
    }

    #[tokio::test]
    async fn test_streaming_chat_forces_stream_flag() {
        let mock_server = MockServer::start().await;

        let body = concat!(
            "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
            ": keep-alive\n\n",
            "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let mut text = String::new();
        let summary = client
            .create_streaming_chat_completion(
                chat_request(),
                &CancellationToken::new(),
                &mut |chunk: ChatCompletionChunk| {
                    if let Some(delta) = chunk.first_delta() {
                        text.push_str(delta);
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(text, "Hello");
        assert_eq!(summary.frames_delivered, 2);
        assert_eq!(summary.frames_dropped, 1);
        assert_eq!(summary.lines_ignored, 1);
    }

    #[tokio::test]
    async fn test_speech_returns_raw_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(body_partial_json(serde_json::json!({"voice": "alloy", "input": "Hi"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(vec![0x49u8, 0x44, 0x33, 0x04]),
            )
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let audio = client
            .create_speech(SpeechRequest::new("tts-1", "Hi", "alloy"))
            .await
            .unwrap();
        assert_eq!(&audio[..], b"ID3\x04");
    }

    #[tokio::test]
    async fn test_transcription_and_translation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(body_partial_json(serde_json::json!({"file": "AQID", "language": "fr"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("bonjour"))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/audio/translations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hello"})))
            .mount(&mock_server)
            .await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();

        let mut request = TranscriptionRequest::new(vec![1, 2, 3], "whisper-1");
        request.language = Some("fr".into());
        assert_eq!(client.create_transcription(request).await.unwrap(), "bonjour");

        let translated = client
            .create_translation(TranslationRequest::new(vec![1, 2, 3], "whisper-1"))
            .await
            .unwrap();
        assert_eq!(translated, "hello");
    }

    #[tokio::test]
    async fn test_image_endpoints_share_body_but_not_path() {
        let mock_server = MockServer::start().await;

        for endpoint_path in ["/images/generations", "/images/edits", "/images/variations"] {
            Mock::given(method("POST"))
                .and(path(endpoint_path))
                .and(body_partial_json(serde_json::json!({"prompt": "A sunset", "n": 1})))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "created": 1700000000,
                    "data": [{"url": format!("https://img.test{endpoint_path}.png")}]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let mut request = ImageGenerationRequest::new("A sunset");
        request.n = Some(1);

        let generated = client.create_image(request.clone()).await.unwrap();
        let edited = client.create_image_edit(request.clone()).await.unwrap();
        let varied = client.create_image_variation(request).await.unwrap();

        assert_eq!(
            generated.data[0].url.as_deref(),
            Some("https://img.test/images/generations.png")
        );
        assert_eq!(edited.data[0].url.as_deref(), Some("https://img.test/images/edits.png"));
        assert_eq!(
            varied.data[0].url.as_deref(),
            Some("https://img.test/images/variations.png")
        );
    }

    #[tokio::test]
    async fn test_client_usable_as_trait_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list", "data": []
            })))
            .mount(&mock_server)
            .await;

        let api: Arc<dyn OpenAiApi> = Arc::new(FlexAiClient::new(mock_server.uri(), "k").unwrap());
        let handle = {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.list_models().await })
        };
        let list = handle.await.unwrap().unwrap();
        assert!(list.data.is_empty());
    }

    // ── Redirects and timeouts ──

    async fn redirecting_server() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list", "data": []
            })))
            .expect(0)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_redirect_is_returned_not_followed() {
        let mock_server = redirecting_server().await;

        let client = FlexAiClient::new(mock_server.uri(), "test-key").unwrap();
        let err = client.list_models().await.unwrap_err();

        assert_eq!(err.status(), Some(302));
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_is_returned_not_followed_from_config() {
        let mock_server = redirecting_server().await;

        let config = ApiConfig {
            base_url: mock_server.uri(),
            api_key: "test-key".into(),
            timeout_secs: Some(5),
        };
        let client = FlexAiClient::from_config(&config).unwrap();
        let err = client.list_models().await.unwrap_err();

        assert_eq!(err.status(), Some(302));
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    fn chunk_line(content: &str) -> Vec<u8> {
        data_line(&format!(
            r#"{{"id":"c1","object":"chat.completion.chunk","created":1,"model":"gpt-4","choices":[{{"index":0,"delta":{{"content":"{content}"}}}}]}}"#
        ))
    }

    fn client_with_timeout(url: String, secs: u64) -> FlexAiClient {
        FlexAiClient::from_config(&ApiConfig {
            base_url: url,
            api_key: "test-key".into(),
            timeout_secs: Some(secs),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_stream_outlives_timeout_while_frames_keep_coming() {
        let gap = Duration::from_millis(400);
        let mut parts = vec![(Duration::ZERO, SSE_HEAD.to_vec())];
        for word in ["a", "b", "c", "d"] {
            parts.push((gap, chunk_line(word)));
        }
        let server = scripted_server(parts, false).await;

        // Four gaps add up to well past the one-second timeout.
        let client = client_with_timeout(server.url, 1);
        let mut text = String::new();
        let summary = client
            .create_streaming_chat_completion(
                chat_request(),
                &CancellationToken::new(),
                &mut |chunk: ChatCompletionChunk| {
                    if let Some(delta) = chunk.first_delta() {
                        text.push_str(delta);
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(text, "abcd");
        assert_eq!(summary.frames_delivered, 4);
    }

    #[tokio::test]
    async fn test_stalled_stream_hits_read_timeout() {
        let parts = vec![
            (Duration::ZERO, SSE_HEAD.to_vec()),
            (Duration::ZERO, chunk_line("a")),
        ];
        let server = scripted_server(parts, true).await;

        let client = client_with_timeout(server.url, 1);
        let mut delivered = 0;
        let err = client
            .create_streaming_chat_completion(
                chat_request(),
                &CancellationToken::new(),
                &mut |_: ChatCompletionChunk| delivered += 1,
            )
            .await
            .unwrap_err();

        assert_eq!(delivered, 1);
        assert!(matches!(&err, ApiError::Transport(e) if e.is_timeout()));
    }
}
