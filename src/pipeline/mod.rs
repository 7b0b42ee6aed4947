// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query-to-article pipeline
//!
//! Per request:
//! 1. Normalise the query to a slug.
//! 2. Serve the stored article if there is one; nothing else runs.
//! 3. Look up links (cache, then link source; fails closed).
//! 4. No links: render the "no results" fallback without calling the
//!    generator and serve it. It is persisted only when the link source
//!    answered; a failed lookup must not pin the placeholder for a day.
//! 5. Links: build the prompt, generate once (deadline + bounded retry),
//!    render, persist, serve.
//!
//! Generator failures surface as errors and leave nothing on disk. The
//! pipeline holds no state of its own beyond handles to the link service,
//! the generator and the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::generator::{build_prompt, ContentGenerator, GenerationError};
use crate::links::{LinkOrigin, LinkService};
use crate::render::ArticleRenderer;
use crate::slug::Slug;
use crate::store::{ArticleStore, StoreError};
use crate::upstream::{call_with_retry, RetryPolicy};

/// Longest accepted query, in characters
pub const MAX_QUERY_CHARS: usize = 500;

/// How the served article came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSource {
    /// Already in the store
    Stored,
    /// Generated for this request
    Generated,
    /// "No results" placeholder, generation skipped
    Fallback,
    /// "No results" placeholder after a failed link lookup, not persisted
    Unavailable,
}

impl ArticleSource {
    /// Whether the served HTML is on disk
    pub fn is_persisted(&self) -> bool {
        !matches!(self, ArticleSource::Unavailable)
    }
}

/// A served article
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub slug: Slug,
    pub source: ArticleSource,
    pub html: String,
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty, oversized or unnormalisable query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Content generation failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Reading or writing the article failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coordinates link lookup, generation, rendering and storage
pub struct ArticlePipeline {
    links: Arc<LinkService>,
    generator: Arc<dyn ContentGenerator>,
    store: ArticleStore,
    renderer: ArticleRenderer,
    generation_policy: RetryPolicy,
}

impl ArticlePipeline {
    pub fn new(
        links: Arc<LinkService>,
        generator: Arc<dyn ContentGenerator>,
        store: ArticleStore,
        renderer: ArticleRenderer,
        generation_policy: RetryPolicy,
    ) -> Self {
        Self {
            links,
            generator,
            store,
            renderer,
            generation_policy,
        }
    }

    /// Validate a raw query and derive its slug
    pub fn normalize(query: &str) -> Result<Slug, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(PipelineError::InvalidQuery(format!(
                "query too long (max {} characters)",
                MAX_QUERY_CHARS
            )));
        }
        Slug::from_query(query).ok_or_else(|| {
            PipelineError::InvalidQuery("query has no letters or digits".to_string())
        })
    }

    /// Run the pipeline for a raw query
    pub async fn run(&self, query: &str) -> Result<PipelineOutcome, PipelineError> {
        let slug = Self::normalize(query)?;
        self.run_for_slug(slug, query).await
    }

    /// Run the pipeline for an already validated slug
    ///
    /// `query` is the text shown as the article title and sent to the
    /// generator.
    pub async fn run_for_slug(
        &self,
        slug: Slug,
        query: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        match self.store.read(&slug).await {
            Ok(html) => {
                debug!("Serving stored article {}", slug);
                return Ok(PipelineOutcome {
                    slug,
                    source: ArticleSource::Stored,
                    html,
                });
            }
            Err(StoreError::NotFound(_)) => {}
            Err(e) => {
                error!("Failed to read article {}: {}", slug, e);
                return Err(e.into());
            }
        }

        let start = Instant::now();
        let lookup = self.links.lookup(&slug, query).await;

        if lookup.origin == LinkOrigin::Failed {
            warn!(query = ?query, "Link lookup failed for {}, serving unsaved fallback", slug);
            return Ok(PipelineOutcome {
                html: self.renderer.render_fallback(query),
                slug,
                source: ArticleSource::Unavailable,
            });
        }

        if lookup.links.is_empty() {
            info!(query = ?query, "No links for {}, rendering fallback article", slug);
            let html = self.renderer.render_fallback(query);
            self.persist(&slug, &html).await?;
            return Ok(PipelineOutcome {
                slug,
                source: ArticleSource::Fallback,
                html,
            });
        }

        if lookup.origin == LinkOrigin::Cache {
            debug!("Using cached links for {}", slug);
        }

        let prompt = build_prompt(query, &lookup.links);
        let markdown = self.generate(&slug, &prompt).await?;

        let html = self
            .renderer
            .render_generated(query, &markdown, &lookup.links);
        self.persist(&slug, &html).await?;

        info!(
            "Generated article {} with {} links in {}ms",
            slug,
            lookup.links.len(),
            start.elapsed().as_millis()
        );

        Ok(PipelineOutcome {
            slug,
            source: ArticleSource::Generated,
            html,
        })
    }

    /// Read a stored article without generating
    pub async fn stored(&self, slug: &Slug) -> Result<Option<String>, PipelineError> {
        match self.store.read(slug).await {
            Ok(html) => Ok(Some(html)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn links(&self) -> &LinkService {
        &self.links
    }

    async fn generate(&self, slug: &Slug, prompt: &str) -> Result<String, PipelineError> {
        let generator = self.generator.clone();
        let start = Instant::now();
        let result = call_with_retry(
            &self.generation_policy,
            generator.name(),
            || {
                let generator = generator.clone();
                async move { generator.generate(prompt).await }
            },
            |timeout: Duration| GenerationError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            },
        )
        .await;

        match result {
            Ok(text) => {
                debug!(
                    "Generated {} chars for {} in {}ms",
                    text.len(),
                    slug,
                    start.elapsed().as_millis()
                );
                Ok(text)
            }
            Err(e) => {
                error!("Generation failed for {}: {}", slug, e);
                Err(e.into())
            }
        }
    }

    async fn persist(&self, slug: &Slug, html: &str) -> Result<(), PipelineError> {
        self.store.write(slug, html).await.map_err(|e| {
            error!("Failed to persist article {}: {}", slug, e);
            PipelineError::from(e)
        })
    }
}
