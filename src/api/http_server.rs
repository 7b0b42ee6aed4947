// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server wiring

use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{
    article_handler, health_handler, index_handler, search_handler, suggest_handler,
};
use super::rate_limiter::ClientRateLimiter;
use crate::pipeline::ArticlePipeline;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ArticlePipeline>,
    pub limiter: Arc<ClientRateLimiter>,
    pub index_page: Arc<str>,
    /// Use `X-Forwarded-For` as the client identity
    pub trust_forwarded_for: bool,
    /// Generate missing articles on `GET /articles/{slug}`
    pub generate_on_demand: bool,
}

impl AppState {
    pub fn new(
        pipeline: Arc<ArticlePipeline>,
        limiter: Arc<ClientRateLimiter>,
        index_page: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            pipeline,
            limiter,
            index_page: index_page.into(),
            trust_forwarded_for: false,
            generate_on_demand: true,
        }
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn with_generate_on_demand(mut self, enabled: bool) -> Self {
        self.generate_on_demand = enabled;
        self
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/search", post(search_handler))
        .route("/articles/:slug", get(article_handler))
        .route("/suggest", get(suggest_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `addr` until ctrl-c
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await?;

    Ok(())
}
