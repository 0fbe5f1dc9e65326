//! Integration tests for the request client over a real HTTP server.
//!
//! Spins up an axum server on an ephemeral port and drives
//! `RequestClient` through `ReqwestTransport`:
//! 1. Success and parse errors
//! 2. Server error bodies and fallbacks
//! 3. Retry of transient statuses
//! 4. Timeouts and connection failures

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use advisor_core::application::{cancellation, RequestClient};
use advisor_core::domain::request::{FailureKind, RequestConfig, RequestOutcome};

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Clone, Default)]
struct ServerState {
    flaky_hits: Arc<AtomicUsize>,
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "answer": body.get("q").cloned().unwrap_or(Value::Null) }))
}

async fn flaky(State(state): State<ServerState>) -> (StatusCode, Json<Value>) {
    let hit = state.flaky_hits.fetch_add(1, Ordering::SeqCst);
    if hit < 3 {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Service warming up" })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "ok": true })))
    }
}

async fn bad_request() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Text is required", "details": "field 'text' was empty" })),
    )
}

async fn bad_gateway() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({ "late": true }))
}

async fn not_json() -> &'static str {
    "<html>oops</html>"
}

struct TestServer {
    addr: SocketAddr,
    state: ServerState,
}

impl TestServer {
    async fn start() -> Self {
        let state = ServerState::default();
        let app = Router::new()
            .route("/api/echo", post(echo))
            .route("/api/flaky", post(flaky))
            .route("/api/bad-request", post(bad_request))
            .route("/api/bad-gateway", post(bad_gateway))
            .route("/api/slow", post(slow))
            .route("/api/not-json", post(not_json))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn client() -> RequestClient {
    RequestClient::with_reqwest().unwrap()
}

// =============================================================================
// Responses
// =============================================================================

#[tokio::test]
async fn echo_returns_parsed_body() {
    let server = TestServer::start().await;

    let outcome = client()
        .send(&RequestConfig::new(server.url("/api/echo"), json!({ "q": "hi" })))
        .await;

    assert_eq!(outcome, RequestOutcome::success(200, json!({ "answer": "hi" }), 1));
}

#[tokio::test]
async fn non_json_success_is_parse_error() {
    let server = TestServer::start().await;

    let outcome = client()
        .send(&RequestConfig::new(server.url("/api/not-json"), json!({})))
        .await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ParseError);
    assert_eq!(failure.status, Some(200));
}

#[tokio::test]
async fn error_body_message_and_details_are_surfaced() {
    let server = TestServer::start().await;

    let outcome = client()
        .send(&RequestConfig::new(server.url("/api/bad-request"), json!({})))
        .await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::HttpError);
    assert_eq!(failure.status, Some(400));
    assert_eq!(failure.message, "Text is required");
    assert_eq!(failure.details.as_deref(), Some("field 'text' was empty"));
}

#[tokio::test]
async fn empty_error_body_uses_status_line() {
    let server = TestServer::start().await;

    let outcome = client()
        .send(&RequestConfig::new(server.url("/api/bad-gateway"), json!({})))
        .await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.status, Some(502));
    assert_eq!(failure.message, "Server error: 502 Bad Gateway");
}

#[tokio::test]
async fn unknown_route_is_http_error() {
    let server = TestServer::start().await;

    let outcome = client()
        .send(&RequestConfig::new(server.url("/api/missing"), json!({})))
        .await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::HttpError);
    assert_eq!(failure.status, Some(404));
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn transient_status_is_retried_until_success() {
    let server = TestServer::start().await;
    let config = RequestConfig::new(server.url("/api/flaky"), json!({}))
        .with_max_attempts(4)
        .with_backoff_base(Duration::from_millis(5));

    let outcome = client().send(&config).await;

    assert_eq!(outcome, RequestOutcome::success(200, json!({ "ok": true }), 4));
    assert_eq!(server.state.flaky_hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn retry_budget_exhaustion_returns_last_failure() {
    let server = TestServer::start().await;
    let config = RequestConfig::new(server.url("/api/flaky"), json!({}))
        .with_max_attempts(2)
        .with_backoff_base(Duration::from_millis(5));

    let outcome = client().send(&config).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.status, Some(503));
    assert_eq!(failure.message, "Service warming up");
    assert_eq!(failure.attempts, 2);
    assert_eq!(server.state.flaky_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = TestServer::start().await;
    let config = RequestConfig::new(server.url("/api/bad-request"), json!({}))
        .with_max_attempts(3)
        .with_backoff_base(Duration::from_millis(5));

    let outcome = client().send(&config).await;

    assert_eq!(outcome.attempts(), 1);
}

// =============================================================================
// Timeouts, cancellation and connectivity
// =============================================================================

#[tokio::test]
async fn slow_server_times_out() {
    let server = TestServer::start().await;
    let config = RequestConfig::new(server.url("/api/slow"), json!({})).with_timeout_ms(50);

    let outcome = client().send(&config).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.message, "Request timed out after 50 ms");
}

#[tokio::test]
async fn cancel_aborts_slow_request() {
    let server = TestServer::start().await;
    let config = RequestConfig::new(server.url("/api/slow"), json!({}));
    let (handle, token) = cancellation();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });
    let outcome = client().send_cancellable(&config, &token).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::NetworkError);
    assert_eq!(failure.message, "Request was cancelled");
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = RequestConfig::new(format!("http://{}/api/echo", addr), json!({}));

    let outcome = client().send(&config).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::NetworkError);
    assert!(failure.status.is_none());
}
