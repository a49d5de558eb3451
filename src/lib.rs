//! # dpai - Streaming AI-Analysis Client
//!
//! A small, pragmatic Rust client for the data-profiling platform's AI
//! analysis endpoint. It sends one question about a completed profiling task
//! and decodes the Server-Sent-Events answer stream into typed messages.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental SSE frame decoding; lines may split across network chunks
//! - Typed messages: status, progress (with workflow node data), content, error
//! - Callback or `Stream` consumption, caller's choice
//! - Local recovery from malformed progress payloads; one bad frame never
//!   aborts a session
//!
//! ## Session lifecycle
//!
//! A decode session lives exactly as long as one streaming request. It ends
//! on the `[DONE]` sentinel, on natural end of the body, or on a transport
//! failure; per session exactly one terminal outcome is reported, and the
//! decode buffer is dropped on every exit path.
//!
//! ## Example
//! ```no_run
//! use dpai::client::AnalysisClient;
//! use dpai::model::AnalysisRequest;
//! use dpai::options::{HttpTransport, TransportOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalysisClient::new(TransportOptions::new(HttpTransport::new(
//!         "http://localhost:8080".to_string(),
//!     )));
//!
//!     let request = AnalysisRequest::new(
//!         "Summarize the data quality issues in this task".to_string(),
//!         "task-42".to_string(),
//!         "user-7".to_string(),
//!     );
//!
//!     let mut messages = Box::pin(client.analyze_stream(&request).await?);
//!     while let Some(message) = messages.next().await {
//!         println!("{:?}", message?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod sse;

// Re-exports for convenience
pub use client::{AnalysisClient, ClientError};
pub use model::{AnalysisRequest, StreamMessage, WorkflowNode};
pub use sse::SseResponseExt;
