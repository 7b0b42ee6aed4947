// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use infintium::{
    api::{start_server, AppState, ClientRateLimiter},
    config::AppConfig,
    generator::GeminiGenerator,
    links::LinkService,
    pipeline::ArticlePipeline,
    render::{load_view, ArticleRenderer, ArticleTemplate, DEFAULT_INDEX_PAGE},
    store::{spawn_sweeper, ArticleStore},
    upstream::RetryPolicy,
    version,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting infintium {}", version::VERSION);

    let config = AppConfig::from_env().context("Failed to read configuration")?;
    config.validate().context("Invalid configuration")?;

    let links = LinkService::from_config(&config.links, &config.upstream)
        .context("Failed to set up link source")?;
    info!(
        "Link source: {} (max {} links, cache ttl {:?})",
        links.source_name(),
        config.links.max_links,
        config.links.cache_ttl()
    );

    let generator =
        GeminiGenerator::from_config(&config.generator, config.upstream.generation_timeout())
            .context("Failed to set up content generator")?;

    let store = ArticleStore::new(&config.store.articles_dir);
    store
        .ensure_dir()
        .await
        .context("Failed to create articles directory")?;
    store
        .remove_temp_files()
        .await
        .context("Failed to clean articles directory")?;
    let _sweeper = spawn_sweeper(store.clone(), config.store.sweep_interval());

    let views_dir = &config.server.views_dir;
    let renderer = ArticleRenderer::new(ArticleTemplate::load(views_dir));
    let index_page = load_view(views_dir, "index.html", DEFAULT_INDEX_PAGE);

    let pipeline = ArticlePipeline::new(
        Arc::new(links),
        Arc::new(generator),
        store,
        renderer,
        RetryPolicy::for_generation(&config.upstream),
    );

    let state = AppState::new(
        Arc::new(pipeline),
        Arc::new(ClientRateLimiter::new(config.server.rate_limit_per_minute)),
        index_page,
    )
    .with_trust_forwarded_for(config.server.trust_forwarded_for)
    .with_generate_on_demand(config.server.generate_on_demand);

    start_server(config.server.bind_addr, state).await
}
