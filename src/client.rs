//! Analysis client and error types.

use futures::{pin_mut, Stream, StreamExt};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use thiserror::Error;

use crate::http::{add_extra_headers, build_http_client};
use crate::model::{AnalysisRequest, StreamMessage};
use crate::options::{HttpTransport, TransportOptions};
use crate::sse::SseResponseExt;

/// Path of the streaming analysis endpoint, relative to the backend base URL.
const ANALYZE_PATH: &str = "/api/v1/ai/analyze";

/// Errors that can occur during client operations.
///
/// Every variant ends the session it occurs in; none is fatal to the host
/// application. Retry and backoff are the caller's decision.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Client for the platform's streaming AI analysis endpoint.
///
/// One instance can serve any number of sessions; all per-session state
/// (decode buffer, current event label) lives inside the stream returned by
/// [`analyze_stream`](Self::analyze_stream).
///
/// # Example
/// ```no_run
/// use dpai::client::AnalysisClient;
/// use dpai::model::{AnalysisRequest, StreamMessage};
/// use dpai::options::{HttpTransport, TransportOptions};
///
/// #[tokio::main]
/// async fn main() {
///     let client = AnalysisClient::new(TransportOptions::new(HttpTransport::new(
///         "http://localhost:8080".to_string(),
///     )));
///
///     let request = AnalysisRequest::new(
///         "Which columns look like primary keys?".to_string(),
///         "task-42".to_string(),
///         "user-7".to_string(),
///     );
///
///     client
///         .analyze(
///             &request,
///             |message| {
///                 if let StreamMessage::Content { content, .. } = message {
///                     print!("{}", content);
///                 }
///             },
///             |err| eprintln!("analysis failed: {}", err),
///             || println!("\n[analysis complete]"),
///         )
///         .await;
/// }
/// ```
pub struct AnalysisClient {
    transport_options: TransportOptions<HttpTransport>,
}

impl AnalysisClient {
    /// Create a new client with the given transport options.
    pub fn new(transport_options: TransportOptions<HttpTransport>) -> Self {
        Self { transport_options }
    }

    /// Get reference to the transport options.
    pub fn transport_options(&self) -> &TransportOptions<HttpTransport> {
        &self.transport_options
    }

    /// Send an analysis request and return the decoded message stream.
    ///
    /// Issues the POST, verifies the response status, and hands the body to
    /// the SSE decoder. The returned stream follows the termination rules of
    /// [`decode_stream`](crate::sse::decode_stream).
    pub async fn analyze_stream(
        &self,
        request: &AnalysisRequest,
    ) -> Result<impl Stream<Item = Result<StreamMessage, ClientError>> + Send, ClientError> {
        let base_url = self
            .transport_options
            .provider
            .base_url
            .clone()
            .ok_or_else(|| ClientError::Config("base URL is required".to_string()))?;

        let url = format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH);

        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream");

        if let Some(api_key) = &self.transport_options.provider.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()));
        }

        req = add_extra_headers(req, &self.transport_options.provider.extra_headers);

        let response = req.json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Service(format!("HTTP {}: {}", status, body)));
        }

        Ok(response.analysis_messages())
    }

    /// Run one analysis session, delivering results through callbacks.
    ///
    /// Each decoded message is handed to `on_message` in stream order before
    /// the next line is processed. Exactly one of `on_error` / `on_complete`
    /// fires per session: `on_error` for a transport failure, a non-success
    /// status, or a configuration problem; `on_complete` for the `[DONE]`
    /// sentinel or natural end of the body. If the caller drops the returned
    /// future before termination, neither fires.
    pub async fn analyze<M, E, C>(
        &self,
        request: &AnalysisRequest,
        mut on_message: M,
        on_error: E,
        on_complete: C,
    ) where
        M: FnMut(StreamMessage),
        E: FnOnce(ClientError),
        C: FnOnce(),
    {
        let messages = match self.analyze_stream(request).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::debug!(%err, "analysis session failed before streaming");
                on_error(err);
                return;
            }
        };
        pin_mut!(messages);

        while let Some(item) = messages.next().await {
            match item {
                Ok(message) => on_message(message),
                Err(err) => {
                    tracing::debug!(%err, "analysis stream failed");
                    on_error(err);
                    return;
                }
            }
        }

        tracing::debug!("analysis session complete");
        on_complete();
    }
}
