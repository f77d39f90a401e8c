//! Running chat history.
//!
//! Keeps the message list sent with every chat request and folds answers
//! back in: whole responses append the first choice, streamed chunks grow
//! the trailing assistant message.

use flexai_core::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role,
};

/// Chat state for one conversation.
#[derive(Clone, Debug)]
pub struct Conversation {
    model: String,
    temperature: Option<f64>,
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new("gpt-3.5-turbo").with_temperature(0.7)
    }
}

impl Conversation {
    /// Empty conversation for `model`, without a temperature override.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            messages: Vec::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Start with a system prompt.
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::system(prompt));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Drop everything except a leading system prompt.
    pub fn clear(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Request carrying the full history.
    pub fn request(&self, stream: bool) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest::new(self.model.clone(), self.messages.clone());
        request.temperature = self.temperature;
        if stream {
            request.stream = Some(true);
        }
        request
    }

    /// Append the first choice of a complete response. Returns its text.
    pub fn apply_response(&mut self, response: &ChatCompletionResponse) -> Option<&str> {
        let message = response.choices.first()?.message.clone();
        self.messages.push(message);
        self.messages.last().map(|m| m.content.as_str())
    }

    /// Fold a streamed chunk into the trailing assistant message.
    ///
    /// A new assistant message is started when the last message is from
    /// someone else. Returns the appended text; chunks without content
    /// (role-only or finish markers) change nothing.
    pub fn apply_chunk(&mut self, chunk: &ChatCompletionChunk) -> Option<String> {
        let delta = chunk.first_delta()?;
        if delta.is_empty() {
            return None;
        }

        let extended = match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content.push_str(delta);
                true
            }
            _ => false,
        };
        if !extended {
            self.messages.push(ChatMessage::assistant(delta));
        }

        Some(delta.to_string())
    }

    /// Undo the last user turn after its request failed, so it isn't resent.
    ///
    /// Removes the trailing user message together with any partial assistant
    /// text streamed in reply to it. Returns the removed user message.
    pub fn rollback_user(&mut self) -> Option<ChatMessage> {
        let turn = self.messages.iter().rposition(|m| m.role != Role::Assistant)?;
        if self.messages[turn].role != Role::User {
            return None;
        }
        let mut removed = self.messages.drain(turn..);
        removed.next()
    }
}
