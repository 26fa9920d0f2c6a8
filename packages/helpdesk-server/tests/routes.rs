//! Router tests against a `MockAI`-backed help desk.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use helpdesk::{
    testing::{sample_chunks, MockAI},
    CategorySet, HelpDesk,
};
use helpdesk_server::server::build_app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(ai: MockAI) -> Router {
    let desk = HelpDesk::new(ai, CategorySet::help_desk_defaults(), sample_chunks())
        .await
        .unwrap();
    build_app(Arc::new(desk))
}

/// Send a request and decode the JSON body.
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, body) = send(app(MockAI::new()).await, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["endpoints"]["submit_request"], "/request");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(MockAI::new()).await, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["knowledge_base"]["chunks"], 5);
    assert_eq!(body["knowledge_base"]["categories"], 7);
}

#[tokio::test]
async fn test_categories_in_priority_order() {
    let (status, body) = send(app(MockAI::new()).await, get("/categories")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_categories"], 7);
    assert_eq!(body["default_category"], "policy_question");
    assert_eq!(body["categories"][0]["name"], "password_reset");

    let security = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "security_incident")
        .unwrap();
    assert_eq!(security["auto_escalate"], "critical");
    assert_eq!(security["escalation_contact"], "security@techcorp.com");
}

#[tokio::test]
async fn test_stats() {
    let (status, body) = send(app(MockAI::new()).await, get("/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 5);
    assert_eq!(body["dimension"], MockAI::EMBEDDING_DIM);
    assert_eq!(body["chunks_by_source"]["company_it_policies.md"], 3);
}

#[tokio::test]
async fn test_submit_request() {
    let ai = MockAI::new()
        .with_classification("password_reset", 0.92, "Forgotten password")
        .with_completion("Visit https://password.techcorp.com to reset it.");

    let (status, body) = send(
        app(ai).await,
        post_json(
            "/request",
            json!({"message": "I forgot my password", "user_id": "u-17"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"]["category"], "password_reset");
    assert_eq!(body["classification_mode"]["mode"], "primary");
    assert_eq!(body["escalation"]["required"], false);
    assert_eq!(body["response"]["status"], "generated");
    assert_eq!(
        body["response"]["text"],
        "Visit https://password.techcorp.com to reset it."
    );
    assert!(body["knowledge"].as_array().is_some());
}

#[tokio::test]
async fn test_submit_request_degraded() {
    let (status, body) = send(
        app(MockAI::new().failing_completions()).await,
        post_json(
            "/request",
            json!({"message": "I think my computer has been hacked", "priority": "high"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"]["category"], "security_incident");
    assert_eq!(body["classification_mode"]["mode"], "fallback");
    assert_eq!(body["escalation"]["urgency"], "critical");
    assert_eq!(body["response"]["status"], "unavailable");
}

#[tokio::test]
async fn test_submit_request_rejects_empty_message() {
    let (status, body) = send(
        app(MockAI::new()).await,
        post_json("/request", json!({"message": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message must not be empty");
}

#[tokio::test]
async fn test_submit_request_rejects_unknown_priority() {
    let (status, _) = send(
        app(MockAI::new()).await,
        post_json("/request", json!({"message": "help", "priority": "whenever"})),
    )
    .await;

    assert!(status.is_client_error());
}
