// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Route handlers

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, error, info};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::pipeline::ArticlePipeline;
use crate::slug::Slug;
use crate::version;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Form body of `POST /search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

/// Query string of `GET /suggest`
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub link_source: String,
    pub articles: usize,
    pub cached_queries: usize,
    pub timestamp: String,
}

/// GET / - entry page
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.index_page.to_string())
}

/// POST /search - generate (or reuse) the article for a query
///
/// Redirects to `/articles/{slug}` on success. When the link source is
/// down the unsaved "no results" page is served inline with a 503.
///
/// # Errors
/// - 400 Bad Request: empty, oversized or unusable query
/// - 429 Too Many Requests: client over its search budget
/// - 500 Internal Server Error: generation or storage failed
pub async fn search_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Result<Response, ApiError> {
    let client = client_key(
        connect_info.as_ref().map(|ConnectInfo(addr)| addr),
        &headers,
        state.trust_forwarded_for,
    );
    admit(&state, &client)?;

    let slug = ArticlePipeline::normalize(&form.query)?;
    debug!(query = ?form.query, "Search for {} from {}", slug, client);

    let outcome = state.pipeline.run_for_slug(slug, &form.query).await?;
    if !outcome.source.is_persisted() {
        return Ok(unavailable(outcome.html));
    }
    Ok(Redirect::to(&article_path(&outcome.slug)).into_response())
}

/// GET /articles/:slug - serve a stored article
///
/// Non-canonical slugs redirect to `/`. Missing articles are generated when
/// on-demand generation is enabled, otherwise they also redirect to `/`.
pub async fn article_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Path(segment): Path<String>,
) -> Result<Response, ApiError> {
    let segment = segment.strip_suffix(".html").unwrap_or(&segment);
    let slug = match Slug::from_path(segment) {
        Some(slug) => slug,
        None => {
            debug!(segment = ?segment, "Rejected article path");
            return Ok(Redirect::to("/").into_response());
        }
    };

    if let Some(html) = state.pipeline.stored(&slug).await? {
        return Ok(Html(html).into_response());
    }

    if !state.generate_on_demand {
        return Ok(Redirect::to("/").into_response());
    }

    let client = client_key(
        connect_info.as_ref().map(|ConnectInfo(addr)| addr),
        &headers,
        state.trust_forwarded_for,
    );
    admit(&state, &client)?;

    info!("Generating missing article {} on demand", slug);
    let query = slug.to_query();
    let outcome = state.pipeline.run_for_slug(slug, &query).await?;
    if !outcome.source.is_persisted() {
        return Ok(unavailable(outcome.html));
    }
    Ok(Html(outcome.html).into_response())
}

/// GET /suggest?q= - stored slugs matching a partial query
pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Response {
    match state.pipeline.store().suggest(&params.q).await {
        Ok(slugs) => Json(slugs).into_response(),
        Err(e) => {
            error!("Suggest failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::<String>::new())).into_response()
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let articles = match state.pipeline.store().count().await {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to count articles: {}", e);
            0
        }
    };
    let links = state.pipeline.links();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION.to_string(),
        link_source: links.source_name().to_string(),
        articles,
        cached_queries: links.cache_stats().total,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

fn admit(state: &AppState, client: &str) -> Result<(), ApiError> {
    state.limiter.check_and_record(client).map_err(|wait| {
        debug!("Rate limited {} for {:?}", client, wait);
        ApiError::RateLimitExceeded {
            retry_after: retry_after_secs(wait),
        }
    })
}

fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

fn unavailable(html: String) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response()
}

fn article_path(slug: &Slug) -> String {
    format!("/articles/{}", slug)
}

/// Identity used for rate limiting
///
/// The first `X-Forwarded-For` entry when trusted, else the peer IP.
pub fn client_key(peer: Option<&SocketAddr>, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
