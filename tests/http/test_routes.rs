// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route tests for the entry page, search, articles, suggest and health

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

use infintium::api::{create_router, AppState, ClientRateLimiter, HealthResponse};
use infintium::clock::ManualClock;
use infintium::render::DEFAULT_INDEX_PAGE;
use infintium::ArticlePipeline;

use crate::common::{build_pipeline, FakeGenerator, FakeLinkSource};

fn app_with(pipeline: ArticlePipeline, generate_on_demand: bool) -> Router {
    let state = AppState::new(
        Arc::new(pipeline),
        Arc::new(ClientRateLimiter::new(1_000)),
        DEFAULT_INDEX_PAGE,
    )
    .with_generate_on_demand(generate_on_demand);
    create_router(state)
}

fn default_pipeline(dir: &std::path::Path) -> ArticlePipeline {
    build_pipeline(
        Arc::new(FakeLinkSource::with_links(10)),
        Arc::new(FakeGenerator::ok()),
        dir,
        ManualClock::new(),
        Duration::from_secs(5),
    )
}

fn search_request(query: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("query={}", query)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_index_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"action="/search""#));
}

#[tokio::test]
async fn test_search_redirects_to_article() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    let response = app
        .clone()
        .oneshot(search_request("Photosynthesis"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/articles/photosynthesis");

    let response = app
        .oneshot(get("/articles/photosynthesis"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("<h1>Photosynthesis</h1>"));
    assert!(body.contains("Generated body for"));
    assert_eq!(body.matches("<a href=").count(), 10);
}

#[tokio::test]
async fn test_search_encoded_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    let response = app
        .oneshot(search_request("What+is+2%2B2%3F"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/articles/what-is-2-2");
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    for body in ["query=", "query=%20%20", "other=1"] {
        let response = app.clone().oneshot(search_request_raw(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
}

fn search_request_raw(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_search_generation_failure_is_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(
        Arc::new(FakeLinkSource::with_links(3)),
        Arc::new(FakeGenerator::failing()),
        dir.path(),
        ManualClock::new(),
        Duration::from_secs(5),
    );
    let app = app_with(pipeline, true);

    let response = app.oneshot(search_request("rust")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(!body.contains("model exploded"));
    assert!(!dir.path().join("rust.html").exists());
}

#[tokio::test]
async fn test_search_with_link_source_down_serves_unsaved_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeGenerator::ok());
    let pipeline = build_pipeline(
        Arc::new(FakeLinkSource::with_links(3).failing_first(1)),
        generator.clone(),
        dir.path(),
        ManualClock::new(),
        Duration::from_secs(5),
    );
    let app = app_with(pipeline, true);

    let response = app.clone().oneshot(search_request("rust")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(response).await;
    assert!(body.contains("No results were found"));
    assert!(!dir.path().join("rust.html").exists());

    let response = app.oneshot(search_request("rust")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/articles/rust");
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_article_path_guard() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    for uri in [
        "/articles/Photosynthesis",
        "/articles/foo--bar",
        "/articles/-foo",
        "/articles/..%2Fsecret",
        "/articles/foo%20bar",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri {}", uri);
        assert_eq!(location(&response), "/");
    }
}

#[tokio::test]
async fn test_article_with_html_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), false);

    app.clone().oneshot(search_request("tides")).await.unwrap();
    let response = app.oneshot(get("/articles/tides.html")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_article_redirects_without_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(FakeGenerator::ok());
    let pipeline = build_pipeline(
        Arc::new(FakeLinkSource::with_links(3)),
        generator.clone(),
        dir.path(),
        ManualClock::new(),
        Duration::from_secs(5),
    );
    let app = app_with(pipeline, false);

    let response = app.oneshot(get("/articles/unknown-topic")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_missing_article_generated_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    let response = app
        .oneshot(get("/articles/plate-tectonics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("<h1>plate tectonics</h1>"));
    assert!(dir.path().join("plate-tectonics.html").exists());
}

#[tokio::test]
async fn test_on_demand_title_comes_from_slug_words() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    // "2+2" was lost when slugified, so the regenerated article is not
    // treated as arithmetic and keeps its reference links
    let response = app.oneshot(get("/articles/2-2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("<h1>2 2</h1>"));
    assert_eq!(body.matches("<a href=").count(), 10);
}

#[tokio::test]
async fn test_suggest() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    for query in ["rust programming", "rusty nails", "python"] {
        app.clone().oneshot(search_request(query)).await.unwrap();
    }

    let response = app.clone().oneshot(get("/suggest?q=Rust")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let slugs: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(slugs, vec!["rust-programming", "rusty-nails"]);

    let response = app
        .clone()
        .oneshot(get("/suggest?q=rust-prog"))
        .await
        .unwrap();
    let slugs: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(slugs, vec!["rust-programming"]);

    let response = app.oneshot(get("/suggest")).await.unwrap();
    let slugs: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(slugs.is_empty());
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(default_pipeline(dir.path()), true);

    app.clone().oneshot(search_request("tides")).await.unwrap();
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.link_source, "fake");
    assert_eq!(health.articles, 1);
    assert_eq!(health.cached_queries, 1);
    assert!(body.contains("\"linkSource\""));
}
