//! Dispatcher — executes one endpoint descriptor over HTTP.
//!
//! Every call is independent: build URL, attach bearer auth and the JSON
//! body, send exactly once, check the status, then either decode the whole
//! body ([`Dispatcher::send`] and friends) or read it line by line and hand
//! each decoded `data: ` frame to a callback ([`Dispatcher::stream`]).
//!
//! No retries, no caching, no timeout of its own. Deadlines and redirect
//! handling belong to the `reqwest::Client` handed in at construction;
//! [`http_client_builder`] gives the settings the rest of the crate assumes.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::session::SessionContext;
use crate::sse::{classify_line, Line, LineFramer};

/// Counters describing how a streamed body was consumed.
///
/// Frames that fail to decode are skipped without an error; this is the
/// only place their number shows up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Frames decoded and passed to the callback.
    pub frames_delivered: usize,
    /// `data: ` lines whose payload did not decode.
    pub frames_dropped: usize,
    /// Non-empty lines without the frame prefix.
    pub lines_ignored: usize,
    /// Reading stopped because the cancellation token fired.
    pub cancelled: bool,
}

impl StreamSummary {
    fn handle_line<T, F>(&mut self, line: &[u8], on_frame: &mut F)
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        match classify_line(line) {
            Line::Frame(payload) => match serde_json::from_slice::<T>(payload) {
                Ok(value) => {
                    self.frames_delivered += 1;
                    on_frame(value);
                }
                Err(e) => {
                    self.frames_dropped += 1;
                    debug!(
                        error = %e,
                        payload = %String::from_utf8_lossy(payload),
                        "dropping undecodable stream frame"
                    );
                }
            },
            Line::Blank => {}
            Line::Other(_) => self.lines_ignored += 1,
        }
    }
}

/// HTTP client settings the dispatcher expects.
///
/// Redirects are not followed: a 3xx comes back as [`ApiError::Http`] and
/// each call makes exactly one request.
pub fn http_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder().redirect(reqwest::redirect::Policy::none())
}

/// Sends endpoint descriptors for one [`SessionContext`].
///
/// Cheap to clone: the HTTP client is a handle onto a shared connection
/// pool and the session is behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    http: reqwest::Client,
    session: Arc<SessionContext>,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, session: Arc<SessionContext>) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Build the request: URL, verb, auth, content type and body.
    fn build_request<E>(&self, endpoint: &E) -> Result<reqwest::RequestBuilder, ApiError>
    where
        E: Endpoint + ?Sized,
    {
        let url = self.session.url_for(endpoint)?;
        let method = endpoint.method();

        debug!(method = %method, url = %url, "dispatching request");

        let mut request = self
            .http
            .request(method.into(), url)
            .bearer_auth(self.session.api_key())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(body) = endpoint.encode_body() {
            request = request.body(body.map_err(ApiError::Encoding)?);
        }

        Ok(request)
    }

    /// Send once and require a 2xx status. The body is left unread.
    async fn execute<E>(&self, endpoint: &E) -> Result<reqwest::Response, ApiError>
    where
        E: Endpoint + Sync + ?Sized,
    {
        let response = self.build_request(endpoint)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = %status, error = %e, "failed to read error body");
                    return Err(ApiError::Transport(e));
                }
            };
            warn!(
                status = %status,
                path = %endpoint.path(),
                body = %String::from_utf8_lossy(&body),
                "API error"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send and return the complete 2xx body.
    pub async fn send_bytes<E>(&self, endpoint: &E) -> Result<Bytes, ApiError>
    where
        E: Endpoint + Sync + ?Sized,
    {
        let response = self.execute(endpoint).await?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Send and parse the complete 2xx body as JSON.
    pub async fn send<T, E>(&self, endpoint: &E) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        E: Endpoint + Sync + ?Sized,
    {
        let body = self.send_bytes(endpoint).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decoding(e.to_string()))
    }

    /// Send and return the complete 2xx body as UTF-8 text.
    pub async fn send_text<E>(&self, endpoint: &E) -> Result<String, ApiError>
    where
        E: Endpoint + Sync + ?Sized,
    {
        let body = self.send_bytes(endpoint).await?;
        String::from_utf8(body.to_vec()).map_err(|e| ApiError::Decoding(e.to_string()))
    }

    /// Send and feed each decoded `data: ` frame to `on_frame`, in arrival
    /// order, until the server closes the body.
    ///
    /// Frames that fail to decode as `T` are skipped. A line longer than
    /// [`MAX_LINE_LEN`](crate::sse::MAX_LINE_LEN) ends the stream with
    /// [`ApiError::InvalidResponse`]. Dropping the returned future closes the
    /// connection and no further frames are delivered.
    pub async fn stream<T, E, F>(&self, endpoint: &E, on_frame: F) -> Result<StreamSummary, ApiError>
    where
        T: DeserializeOwned,
        E: Endpoint + Sync + ?Sized,
        F: FnMut(T) + Send,
    {
        self.stream_with_cancel(endpoint, &CancellationToken::new(), on_frame)
            .await
    }

    /// Like [`stream`](Self::stream), but stops as soon as `cancel` fires.
    ///
    /// Cancellation is not an error: the summary of what was delivered so
    /// far is returned with `cancelled` set, and the response is dropped.
    pub async fn stream_with_cancel<T, E, F>(
        &self,
        endpoint: &E,
        cancel: &CancellationToken,
        mut on_frame: F,
    ) -> Result<StreamSummary, ApiError>
    where
        T: DeserializeOwned,
        E: Endpoint + Sync + ?Sized,
        F: FnMut(T) + Send,
    {
        let mut summary = StreamSummary::default();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.cancelled = true;
                return Ok(summary);
            }
            response = self.execute(endpoint) => response?,
        };

        let mut body = response.bytes_stream();
        let mut framer = LineFramer::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(chunk) => {
                    framer.push(&chunk?);
                    while let Some(line) = framer.next_line() {
                        if cancel.is_cancelled() {
                            summary.cancelled = true;
                            break;
                        }
                        summary.handle_line(&line, &mut on_frame);
                    }
                    if summary.cancelled {
                        break;
                    }
                    if framer.overflowed() {
                        warn!(limit = framer.max_line(), "stream line too long");
                        return Err(ApiError::InvalidResponse(format!(
                            "stream line longer than {} bytes",
                            framer.max_line()
                        )));
                    }
                }
                None => {
                    if let Some(line) = framer.finish() {
                        summary.handle_line(&line, &mut on_frame);
                    }
                    break;
                }
            }
        }

        debug!(
            delivered = summary.frames_delivered,
            dropped = summary.frames_dropped,
            ignored = summary.lines_ignored,
            cancelled = summary.cancelled,
            "stream finished"
        );

        Ok(summary)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
