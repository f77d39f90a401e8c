//! One chat turn: send the history, print the reply, keep the transcript.

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use flexai_client::{CancellationToken, Conversation, OpenAiApi};
use flexai_core::types::ChatCompletionChunk;

use crate::helpers;

/// Send `input` as the next user message and return the assistant's reply.
///
/// In streaming mode deltas are printed as they arrive and Ctrl-C stops the
/// stream, keeping whatever was received. A failed request leaves the
/// conversation as it was before the call.
pub async fn ask(
    api: &dyn OpenAiApi,
    convo: &mut Conversation,
    input: &str,
    stream: bool,
) -> Result<String> {
    convo.push_user(input);

    let result = if stream {
        ask_streaming(api, convo).await
    } else {
        ask_whole(api, convo).await
    };

    if result.is_err() {
        convo.rollback_user();
    }
    result
}

async fn ask_whole(api: &dyn OpenAiApi, convo: &mut Conversation) -> Result<String> {
    let response = api.create_chat_completion(convo.request(false)).await?;
    if let Some(usage) = &response.usage {
        debug!(
            prompt = usage.prompt_tokens,
            total = usage.total_tokens,
            "token usage"
        );
    }
    Ok(convo.apply_response(&response).unwrap_or_default().to_string())
}

async fn ask_streaming(api: &dyn OpenAiApi, convo: &mut Conversation) -> Result<String> {
    let request = convo.request(true);
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());

    helpers::print_stream_header();

    let mut reply = String::new();
    let outcome = {
        let mut on_chunk = |chunk: ChatCompletionChunk| {
            if let Some(delta) = convo.apply_chunk(&chunk) {
                helpers::print_delta(&delta);
                reply.push_str(&delta);
            }
        };
        api.create_streaming_chat_completion(request, &cancel, &mut on_chunk)
            .await
    };
    watcher.abort();

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            helpers::finish_stream(!reply.is_empty(), false);
            return Err(e.into());
        }
    };

    helpers::finish_stream(!reply.is_empty(), summary.cancelled);
    info!(
        delivered = summary.frames_delivered,
        dropped = summary.frames_dropped,
        cancelled = summary.cancelled,
        "stream finished"
    );
    Ok(reply)
}

/// Cancel `token` on the first Ctrl-C. Abort the handle once the stream ends.
fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received, cancelling stream");
            token.cancel();
        }
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
