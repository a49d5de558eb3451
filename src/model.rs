//! Data models for analysis requests and decoded stream messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Request body for the streaming analysis endpoint.
///
/// Serialized camelCase to match the platform's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Free-text question about the profiling results
    pub question: String,

    /// Identifier of the completed profiling task to analyze
    pub task_id: String,

    /// Identifier of the requesting user
    pub user_id: String,
}

impl AnalysisRequest {
    /// Create a new analysis request.
    pub fn new(question: String, task_id: String, user_id: String) -> Self {
        Self {
            question,
            task_id,
            user_id,
        }
    }
}

/// A decoded message from the analysis stream.
///
/// One message is produced per non-empty `data:` line; the variant is chosen
/// from the preceding `event:` label. Every variant carries the originating
/// label so callers can distinguish e.g. `connected` from `finished` inside
/// the status kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StreamMessage {
    /// Lifecycle notification (`status`, `connected`, `started`, `finished`,
    /// `complete` events)
    Status { event: String, content: String },

    /// Workflow progress update; `node` is present when the payload parsed
    /// as a node-execution record
    Progress {
        event: String,
        content: String,
        node: Option<WorkflowNode>,
    },

    /// A slice of the generated answer (`chunk` and unrecognized events)
    Content { event: String, content: String },

    /// Server-reported analysis failure
    Error { event: String, error: String },
}

impl StreamMessage {
    /// Get the SSE event label this message was decoded under.
    pub fn event(&self) -> &str {
        match self {
            StreamMessage::Status { event, .. } => event,
            StreamMessage::Progress { event, .. } => event,
            StreamMessage::Content { event, .. } => event,
            StreamMessage::Error { event, .. } => event,
        }
    }

    /// Get the textual payload, if the message carries one.
    pub fn content(&self) -> Option<&str> {
        match self {
            StreamMessage::Status { content, .. } => Some(content),
            StreamMessage::Progress { content, .. } => Some(content),
            StreamMessage::Content { content, .. } => Some(content),
            StreamMessage::Error { .. } => None,
        }
    }
}

/// Node-execution record carried in `progress` event payloads.
///
/// Emitted by the backend workflow engine once per executed node. All fields
/// are optional; the engine omits whatever does not apply to a node type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkflowNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Position of the node in the workflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub predecessor_node_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<HashMap<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_data: Option<HashMap<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<HashMap<String, Value>>,

    /// Node execution status (e.g. "running", "succeeded", "failed")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock execution time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_metadata: Option<ExecutionMetadata>,

    /// Unix timestamp of node start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Unix timestamp of node completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
}

/// Token accounting attached to a workflow node execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExecutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}
