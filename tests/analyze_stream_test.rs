//! Integration tests for the streaming analysis client.
//!
//! These tests run the full path: request building, status checking, and
//! SSE decoding of a real HTTP response body served by a mock backend.

use std::sync::{Arc, Mutex};

use dpai::client::{AnalysisClient, ClientError};
use dpai::model::{AnalysisRequest, StreamMessage};
use dpai::options::{HttpTransport, TransportOptions};
use futures::StreamExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_request() -> AnalysisRequest {
    AnalysisRequest::new(
        "Which tables have duplicate rows?".to_string(),
        "task-42".to_string(),
        "user-7".to_string(),
    )
}

fn client_for(server: &MockServer) -> AnalysisClient {
    AnalysisClient::new(TransportOptions::new(HttpTransport::new(server.uri())))
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

#[tokio::test]
async fn analyze_stream_decodes_full_session() {
    let server = MockServer::start().await;

    let body = "event: connected\n\
                data: analysis session established\n\
                \n\
                event: progress\n\
                data: {\"node_id\":\"n1\",\"title\":\"Load report\",\"status\":\"succeeded\"}\n\
                \n\
                event: chunk\n\
                data: Column email has 3% duplicates.\n\
                \n\
                data: [DONE]\n";

    Mock::given(method("POST"))
        .and(path("/api/v1/ai/analyze"))
        .and(header("accept", "text/event-stream"))
        .and(body_json(serde_json::json!({
            "question": "Which tables have duplicate rows?",
            "taskId": "task-42",
            "userId": "user-7",
        })))
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages: Vec<StreamMessage> = client
        .analyze_stream(&sample_request())
        .await
        .expect("request should succeed")
        .map(|item| item.expect("no decode errors expected"))
        .collect()
        .await;

    assert_eq!(messages.len(), 3);
    assert!(matches!(
        &messages[0],
        StreamMessage::Status { event, content }
            if event == "connected" && content == "analysis session established"
    ));
    match &messages[1] {
        StreamMessage::Progress {
            node: Some(node), ..
        } => {
            assert_eq!(node.node_id.as_deref(), Some("n1"));
            assert_eq!(node.status.as_deref(), Some("succeeded"));
        }
        other => panic!("expected progress with node data, got {:?}", other),
    }
    assert!(matches!(
        &messages[2],
        StreamMessage::Content { event, content }
            if event == "chunk" && content == "Column email has 3% duplicates."
    ));
}

#[tokio::test]
async fn analyze_fires_complete_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai/analyze"))
        .respond_with(sse_response(
            "event: chunk\ndata: partial answer\n\ndata: [DONE]\n",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let received = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(0u32));
    let completions = Arc::new(Mutex::new(0u32));

    client
        .analyze(
            &sample_request(),
            {
                let received = received.clone();
                move |message| received.lock().unwrap().push(message)
            },
            {
                let errors = errors.clone();
                move |_| *errors.lock().unwrap() += 1
            },
            {
                let completions = completions.clone();
                move || *completions.lock().unwrap() += 1
            },
        )
        .await;

    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(*errors.lock().unwrap(), 0);
    assert_eq!(*completions.lock().unwrap(), 1);
}

#[tokio::test]
async fn analyze_reports_http_error_once_without_complete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai/analyze"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(Mutex::new(0u32));

    client
        .analyze(
            &sample_request(),
            |message| panic!("no messages expected, got {:?}", message),
            {
                let errors = errors.clone();
                move |err| errors.lock().unwrap().push(err)
            },
            {
                let completions = completions.clone();
                move || *completions.lock().unwrap() += 1
            },
        )
        .await;

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ClientError::Service(msg) if msg.contains("503")));
    assert_eq!(*completions.lock().unwrap(), 0);
}

#[tokio::test]
async fn analyze_reports_config_error_when_base_url_missing() {
    let client = AnalysisClient::new(TransportOptions::new(HttpTransport::default()));

    let errors = Arc::new(Mutex::new(Vec::new()));
    client
        .analyze(
            &sample_request(),
            |message| panic!("no messages expected, got {:?}", message),
            {
                let errors = errors.clone();
                move |err| errors.lock().unwrap().push(err)
            },
            || panic!("completion not expected"),
        )
        .await;

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ClientError::Config(_)));
}

#[tokio::test]
async fn analyze_sends_bearer_token_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai/analyze"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(sse_response("data: [DONE]\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnalysisClient::new(TransportOptions::new(
        HttpTransport::new(server.uri()).with_api_key("secret-token"),
    ));

    let completions = Arc::new(Mutex::new(0u32));
    client
        .analyze(
            &sample_request(),
            |message| panic!("no messages expected, got {:?}", message),
            |err| panic!("unexpected error: {}", err),
            {
                let completions = completions.clone();
                move || *completions.lock().unwrap() += 1
            },
        )
        .await;

    assert_eq!(*completions.lock().unwrap(), 1);
}

#[tokio::test]
async fn natural_end_of_stream_completes_without_done_marker() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai/analyze"))
        .respond_with(sse_response("event: chunk\ndata: tail of answer\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let received = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(Mutex::new(0u32));

    client
        .analyze(
            &sample_request(),
            {
                let received = received.clone();
                move |message| received.lock().unwrap().push(message)
            },
            |err| panic!("unexpected error: {}", err),
            {
                let completions = completions.clone();
                move || *completions.lock().unwrap() += 1
            },
        )
        .await;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert!(matches!(
        &received[0],
        StreamMessage::Content { content, .. } if content == "tail of answer"
    ));
    assert_eq!(*completions.lock().unwrap(), 1);
}
