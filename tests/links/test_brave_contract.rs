// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Brave Search API contract tests

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infintium::links::{BraveLinkSource, LinkSource, LinkSourceError};

fn source(server: &MockServer) -> BraveLinkSource {
    BraveLinkSource::with_base_url(
        "test-key".to_string(),
        &server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_request_format() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "rust language"))
        .and(query_param("count", "10"))
        .and(header("X-Subscription-Token", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "web": { "results": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let links = source(&server).fetch_links("rust language", 10).await.unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_results_are_validated_and_capped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "web": { "results": [
                { "url": "https://www.rust-lang.org/", "title": "Rust" },
                { "url": "javascript:alert(1)", "title": "bad" },
                { "url": "https://www.rust-lang.org/", "title": "dup" },
                { "url": "https://doc.rust-lang.org/book/", "title": "Book" },
                { "url": "https://crates.io/", "title": "Crates" }
            ]}
        })))
        .mount(&server)
        .await;

    let links = source(&server).fetch_links("rust", 2).await.unwrap();
    assert_eq!(
        links.as_slice(),
        &[
            "https://www.rust-lang.org/".to_string(),
            "https://doc.rust-lang.org/book/".to_string()
        ]
    );
}

#[tokio::test]
async fn test_missing_web_section_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": {} })))
        .mount(&server)
        .await;

    assert!(source(&server).fetch_links("x", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_key_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = source(&server).fetch_links("x", 10).await;
    assert!(matches!(result, Err(LinkSourceError::Unavailable(_))));
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    match source(&server).fetch_links("x", 10).await {
        Err(LinkSourceError::Status { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = source(&server).fetch_links("x", 10).await;
    assert!(matches!(result, Err(LinkSourceError::Parse(_))));
}
