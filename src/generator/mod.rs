// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Article text generation
//!
//! A [`ContentGenerator`] turns one prompt into markdown. The Gemini client
//! is the production implementation; the pipeline only sees the trait.

pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod types;

pub use gemini::GeminiGenerator;
pub use prompt::build_prompt;
pub use provider::ContentGenerator;
pub use types::GenerationError;
