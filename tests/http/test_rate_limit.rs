// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Per-client search budget on POST /search

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use infintium::api::{create_router, AppState, ClientRateLimiter};
use infintium::clock::ManualClock;

use crate::common::{build_pipeline, FakeGenerator, FakeLinkSource};

fn build_app(dir: &std::path::Path, clock: ManualClock, trust_forwarded_for: bool) -> Router {
    let pipeline = build_pipeline(
        Arc::new(FakeLinkSource::with_links(2)),
        Arc::new(FakeGenerator::ok()),
        dir,
        ManualClock::new(),
        Duration::from_secs(5),
    );
    let limiter = ClientRateLimiter::with_clock(10, Duration::from_secs(60), Arc::new(clock));
    let state = AppState::new(Arc::new(pipeline), Arc::new(limiter), "<html></html>")
        .with_trust_forwarded_for(trust_forwarded_for);
    create_router(state)
}

fn search(query: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder
        .body(Body::from(format!("query={}", query)))
        .unwrap()
}

#[tokio::test]
async fn test_eleventh_search_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path(), ManualClock::new(), false)
        .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 1], 40000))));

    for i in 0..10 {
        let response = app
            .clone()
            .oneshot(search(&format!("topic{}", i), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "request {}", i);
    }

    let response = app.oneshot(search("topic10", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    assert!(!dir.path().join("topic10.html").exists());
}

#[tokio::test]
async fn test_window_rolls_over() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new();
    let app = build_app(dir.path(), clock.clone(), false);

    for i in 0..10 {
        app.clone()
            .oneshot(search(&format!("topic{}", i), None))
            .await
            .unwrap();
    }
    let response = app.clone().oneshot(search("late", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    clock.advance(Duration::from_secs(60));
    let response = app.oneshot(search("late", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_forwarded_clients_have_separate_budgets() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path(), ManualClock::new(), true);

    for i in 0..10 {
        app.clone()
            .oneshot(search(&format!("topic{}", i), Some("203.0.113.1")))
            .await
            .unwrap();
    }

    let blocked = app
        .clone()
        .oneshot(search("more", Some("203.0.113.1")))
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .oneshot(search("more", Some("203.0.113.2, 10.0.0.1")))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_stored_articles_are_not_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path(), ManualClock::new(), false);

    for i in 0..10 {
        app.clone()
            .oneshot(search(&format!("topic{}", i), None))
            .await
            .unwrap();
    }

    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/articles/topic0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
