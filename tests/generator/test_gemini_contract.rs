// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Gemini generateContent contract tests

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infintium::generator::{ContentGenerator, GeminiGenerator, GenerationError};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn generator(server: &MockServer) -> GeminiGenerator {
    GeminiGenerator::new(
        &server.uri(),
        "gemini-1.5-flash",
        "test-key",
        Duration::from_secs(5),
    )
    .unwrap()
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

#[tokio::test]
async fn test_request_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "USER PROMPT: tides" }] }]
        })))
        .respond_with(text_response("Tides are caused by the moon."))
        .expect(1)
        .mount(&server)
        .await;

    let text = generator(&server)
        .generate("USER PROMPT: tides")
        .await
        .unwrap();
    assert_eq!(text, "Tides are caused by the moon.");
}

#[tokio::test]
async fn test_multiple_parts_are_joined() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }
            }]
        })))
        .mount(&server)
        .await;

    assert_eq!(
        generator(&server).generate("p").await.unwrap(),
        "Hello, world"
    );
}

#[tokio::test]
async fn test_blocked_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let result = generator(&server).generate("p").await;
    assert!(matches!(result, Err(GenerationError::Blocked { .. })));
}

#[tokio::test]
async fn test_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let result = generator(&server).generate("p").await;
    assert!(matches!(result, Err(GenerationError::EmptyResponse)));
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    match generator(&server).generate("p").await {
        Err(GenerationError::Status { status, .. }) => assert_eq!(status, 429),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = generator(&server).generate("p").await;
    assert!(matches!(result, Err(GenerationError::Parse(_))));
}

#[tokio::test]
async fn test_slow_response_reports_client_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(text_response("late").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let generator = GeminiGenerator::new(
        &server.uri(),
        "gemini-1.5-flash",
        "test-key",
        Duration::from_millis(50),
    )
    .unwrap();
    let result = generator.generate("USER PROMPT: tides").await;

    match result {
        Err(e @ GenerationError::Timeout { timeout_ms: 50 }) => {
            assert!(e.to_string().contains("50"));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}
