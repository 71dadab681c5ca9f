//! Wiremock integration tests for the model invocation contract.
//!
//! Covers the full `analyze_receipt` / `compare_inventory` flows against a
//! mocked upstream: request shape, happy-path normalization, the fallback on
//! garbled completions, and the unrecoverable remote-failure paths.

use serde_json::json;
use snapjudge_core::{ImagePayload, SnapjudgeError};
use snapjudge_vision::{analyze_receipt, compare_inventory, ModelClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> ImagePayload {
    ImagePayload::new(b"fake-image-data".to_vec(), Some("image/jpeg".into()))
}

fn client_for(server: &MockServer) -> ModelClient {
    ModelClient::new(server.uri(), "test-key", "test-model")
}

/// Chat-completions body whose first choice carries the given content.
fn completion_body(content: &str) -> serde_json::Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

#[tokio::test]
async fn receipt_happy_path_normalizes_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_completion_tokens": 4096,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"match":true,"confidence":0.95,"retryHint":null,"reason":"found"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyze_receipt(&client_for(&server), &payload(), "아메리카노", 0.8)
        .await
        .expect("analysis should succeed");

    assert!(result.is_match);
    assert_eq!(result.confidence, 0.95);
    assert_eq!(result.retry_hint, None);
    let raw: serde_json::Value = serde_json::from_str(&result.raw_json).unwrap();
    assert_eq!(raw["reason"], "found");
}

#[tokio::test]
async fn receipt_request_embeds_image_as_data_uri() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .mount(&server)
        .await;

    analyze_receipt(&client_for(&server), &payload(), "아메리카노", 0.8)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let user_content = body["messages"][1]["content"].as_array().unwrap();
    assert_eq!(user_content.len(), 2);
    let url = user_content[1]["image_url"]["url"].as_str().unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn fenced_completion_is_unwrapped() {
    let server = MockServer::start().await;

    let fenced = "```json\n{\"match\":false,\"confidence\":0.0,\"retryHint\":\"too blurry\"}\n```";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(fenced)))
        .mount(&server)
        .await;

    let result = analyze_receipt(&client_for(&server), &payload(), "돌체 라떼", 0.8)
        .await
        .unwrap();

    assert!(!result.is_match);
    assert_eq!(result.retry_hint.as_deref(), Some("too blurry"));
}

#[tokio::test]
async fn garbled_completion_yields_fallback_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("not a json at all")),
        )
        .mount(&server)
        .await;

    let result = analyze_receipt(&client_for(&server), &payload(), "아메리카노", 0.8)
        .await
        .expect("malformed output must not surface as an error");

    assert!(!result.is_match);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(
        result.retry_hint.as_deref(),
        Some(snapjudge_vision::normalize::PARSE_FAILURE_HINT)
    );
    serde_json::from_str::<serde_json::Value>(&result.raw_json).unwrap();
}

#[tokio::test]
async fn model_http_500_is_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = analyze_receipt(&client_for(&server), &payload(), "아메리카노", 0.8)
        .await
        .expect_err("500 from the model endpoint must fail the request");

    assert!(matches!(err, SnapjudgeError::Remote { .. }));
}

#[tokio::test]
async fn inventory_sends_reference_image_second() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ref.webp"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/webp; charset=binary")
                .set_body_bytes(b"reference-bytes".to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"match":true,"confidence":0.88,"retryHint":null,"reason":"same product"}"#,
        )))
        .mount(&server)
        .await;

    let reference_url = format!("{}/ref.webp", server.uri());
    let result = compare_inventory(&client_for(&server), &payload(), reference_url, 0.75)
        .await
        .unwrap();

    assert!(result.is_match);
    assert_eq!(result.confidence, 0.88);

    let requests = server.received_requests().await.unwrap();
    let chat_request = requests
        .iter()
        .find(|r| r.url.path() == "/v1/chat/completions")
        .unwrap();
    let body: serde_json::Value = chat_request.body_json().unwrap();
    let user_content = body["messages"][1]["content"].as_array().unwrap();
    assert_eq!(user_content.len(), 3);
    // content-type parameters are stripped before re-encoding
    let reference_uri = user_content[2]["image_url"]["url"].as_str().unwrap();
    assert!(reference_uri.starts_with("data:image/webp;base64,"));
}

#[tokio::test]
async fn reference_fetch_404_fails_before_model_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let reference_url = format!("{}/missing.jpg", server.uri());
    let err = compare_inventory(&client_for(&server), &payload(), reference_url, 0.75)
        .await
        .expect_err("404 on the reference fetch must fail the request");

    assert!(matches!(err, SnapjudgeError::Remote { .. }));
}

#[tokio::test]
async fn reference_fetch_without_content_type_defaults_to_jpeg() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ref.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw".to_vec()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .mount(&server)
        .await;

    let reference_url = format!("{}/ref.bin", server.uri());
    compare_inventory(&client_for(&server), &payload(), reference_url, 0.7)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let chat = requests
        .iter()
        .find(|r| r.url.path() == "/v1/chat/completions")
        .unwrap();
    let body: serde_json::Value = chat.body_json().unwrap();
    let reference_uri = body["messages"][1]["content"][2]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(reference_uri.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn empty_choices_yield_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = analyze_receipt(&client_for(&server), &payload(), "아메리카노", 0.8)
        .await
        .unwrap();

    assert!(!result.is_match);
    assert_eq!(
        result.retry_hint.as_deref(),
        Some(snapjudge_vision::normalize::PARSE_FAILURE_HINT)
    );
}
