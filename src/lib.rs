// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod clock;
pub mod config;
pub mod generator;
pub mod links;
pub mod pipeline;
pub mod render;
pub mod slug;
pub mod store;
pub mod upstream;
pub mod version;

pub use api::{create_router, AppState, ClientRateLimiter};
pub use config::AppConfig;
pub use generator::{ContentGenerator, GeminiGenerator, GenerationError};
pub use links::{LinkService, LinkSet, LinkSource, LinkSourceError};
pub use pipeline::{ArticlePipeline, ArticleSource, PipelineError, PipelineOutcome};
pub use render::ArticleRenderer;
pub use slug::Slug;
pub use store::{ArticleStore, StoreError};
