//! Integration tests for the advisor API against a stand-in backend.
//!
//! The stand-in serves the tool endpoints with the same payload and error
//! shapes as the real backend, so these tests cover:
//! 1. Request bodies reaching each endpoint
//! 2. Response field extraction
//! 3. Registry state across success, failure and concurrent calls

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Notify;

use advisor_core::application::{operation_ids, AdvisorApi, InvoiceRequest, OperationRegistry};
use advisor_core::config::ClientConfig;
use advisor_core::domain::operation::OperationState;
use advisor_core::domain::request::FailureKind;

// =============================================================================
// Stand-in backend
// =============================================================================

type Reply = (StatusCode, Json<Value>);

/// Holds policy requests until the test releases them.
#[derive(Clone, Default)]
struct PolicyGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

fn text_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

async fn simplify(Json(body): Json<Value>) -> Reply {
    match text_field(&body, "text") {
        Some(text) => (
            StatusCode::OK,
            Json(json!({ "summary": format!("Summary of {} chars", text.len()) })),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Contract text is required", "code": 400 })),
        ),
    }
}

async fn check(Json(_body): Json<Value>) -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "An unexpected error occurred while checking content safety",
            "details": "Please try again later"
        })),
    )
}

async fn invoice(Json(body): Json<Value>) -> Reply {
    let brand = text_field(&body, "brand").unwrap_or_default();
    let amount = body.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
    let gst = body.get("include_gst").and_then(Value::as_bool).unwrap_or(false);
    let total = if gst { amount * 1.18 } else { amount };
    (
        StatusCode::OK,
        Json(json!({ "invoice_text": format!("INVOICE {} total {:.2}", brand, total) })),
    )
}

async fn policy(State(gate): State<PolicyGate>, Json(body): Json<Value>) -> Reply {
    gate.entered.notify_one();
    gate.release.notified().await;
    let question = text_field(&body, "question").unwrap_or_default();
    (StatusCode::OK, Json(json!({ "answer": format!("Policy: {}", question) })))
}

async fn ama(Json(body): Json<Value>) -> Reply {
    let question = text_field(&body, "question").unwrap_or_default();
    (StatusCode::OK, Json(json!({ "answer": format!("AMA: {}", question) })))
}

async fn start_backend(gate: PolicyGate) -> String {
    let app = Router::new()
        .route("/api/contract/simplify", post(simplify))
        .route("/api/content/check", post(check))
        .route("/api/invoice/generate", post(invoice))
        .route("/api/youtube/policy", post(policy))
        .route("/api/ama/ask", post(ama))
        .with_state(gate);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn api() -> AdvisorApi {
    api_with_gate(PolicyGate::default()).await
}

async fn api_with_gate(gate: PolicyGate) -> AdvisorApi {
    let config = ClientConfig {
        base_url: start_backend(gate).await,
        backoff_base_ms: 5,
        ..Default::default()
    };
    AdvisorApi::with_reqwest(OperationRegistry::new(), config).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn contract_summary_round_trip() {
    let api = api().await;

    let summary = api.simplify_contract("The tenant pays rent.").await.unwrap();

    assert_eq!(summary, "Summary of 21 chars");
    assert_eq!(
        api.registry().state(operation_ids::CONTRACT_ANALYZER),
        OperationState::Idle
    );
}

#[tokio::test]
async fn invoice_includes_gst_flag() {
    let api = api().await;

    let text = api
        .generate_invoice(&InvoiceRequest::new("Acme", "Sponsored video", 100.0).with_gst(true))
        .await
        .unwrap();

    assert_eq!(text, "INVOICE Acme total 118.00");
}

#[tokio::test]
async fn server_failure_is_recorded_with_details() {
    let api = api().await;

    let err = api.check_content("Is this fine?").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::HttpError));
    assert_eq!(
        err.message(),
        "An unexpected error occurred while checking content safety"
    );
    let record = api.registry().record(operation_ids::CONTENT_CHECKER);
    assert!(!record.loading);
    assert_eq!(
        record.error.as_deref(),
        Some("An unexpected error occurred while checking content safety")
    );
}

#[tokio::test]
async fn concurrent_tools_are_tracked_separately() {
    let gate = PolicyGate::default();
    let api = api_with_gate(gate.clone()).await;
    let registry = api.registry().clone();

    let policy_api = api.clone();
    let policy = tokio::spawn(async move { policy_api.ask_policy("Can I use clips?").await });

    // The policy request is parked in the handler until released.
    gate.entered.notified().await;
    assert!(registry.is_loading(operation_ids::POLICY_ADVISOR));

    let answer = api.ask_ama("Who are you?").await.unwrap();
    assert_eq!(answer, "AMA: Who are you?");
    assert!(!registry.is_loading(operation_ids::AMA));
    assert!(registry.is_loading(operation_ids::POLICY_ADVISOR));

    gate.release.notify_one();

    let policy_answer = policy.await.unwrap().unwrap();
    assert_eq!(policy_answer, "Policy: Can I use clips?");
    assert!(registry.loading_ids().is_empty());
}

#[tokio::test]
async fn errors_stay_scoped_to_their_tool() {
    let api = api().await;

    let _ = api.check_content("first").await;
    assert_eq!(
        api.registry().state(operation_ids::CONTENT_CHECKER),
        OperationState::Errored
    );

    api.simplify_contract("ok").await.unwrap();
    assert_eq!(
        api.registry().state(operation_ids::CONTENT_CHECKER),
        OperationState::Errored
    );
    assert_eq!(
        api.registry().state(operation_ids::CONTRACT_ANALYZER),
        OperationState::Idle
    );
}

#[tokio::test]
async fn parallel_calls_to_one_tool_settle_idle() {
    let api = api().await;

    let questions = ["one", "two", "three", "four"];
    let answers = futures::future::join_all(questions.iter().map(|q| api.ask_ama(q))).await;

    for (question, answer) in questions.iter().zip(answers) {
        assert_eq!(answer.unwrap(), format!("AMA: {}", question));
    }
    assert_eq!(api.registry().state(operation_ids::AMA), OperationState::Idle);
}
