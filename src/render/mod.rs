// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Article rendering
//!
//! Turns generated markdown and a link set into the static HTML page kept in
//! the article store.

pub mod template;

use pulldown_cmark::{html, Options, Parser};

use crate::links::LinkSet;
use crate::slug::{escape_attr, escape_html};

pub use template::{load_view, ArticleTemplate, DEFAULT_INDEX_PAGE};

/// Characters that mark a query as a math expression
pub const MATH_SYMBOLS: &[char] = &['+', '=', '*', '^', '√', '≥', '≤', 'π'];

/// Reference section for math queries
pub const NO_FURTHER_READING: &str =
    r#"<li class="placeholder">No further reading is needed for math expressions.</li>"#;

/// Reference section when the link source found nothing
pub const NO_REFERENCES_FOUND: &str =
    r#"<li class="placeholder">No references were found for this search.</li>"#;

/// Body of the fallback article
pub const NO_RESULTS_BODY: &str = "<p>No results were found for this search. \
Try rephrasing the query or searching for a related topic.</p>";

/// True when the query contains any of [`MATH_SYMBOLS`]
pub fn is_math_expression(query: &str) -> bool {
    query.chars().any(|c| MATH_SYMBOLS.contains(&c))
}

/// Render markdown to sanitised HTML
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut unsafe_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut unsafe_html, parser);

    ammonia::clean(&unsafe_html)
}

/// Reference list items for a query and its links
///
/// Math queries always get the fixed placeholder, regardless of links.
pub fn reference_list(query: &str, links: &LinkSet) -> String {
    if is_math_expression(query) {
        return NO_FURTHER_READING.to_string();
    }
    if links.is_empty() {
        return NO_REFERENCES_FOUND.to_string();
    }
    links
        .iter()
        .map(|url| {
            format!(
                r#"<li><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></li>"#,
                escape_attr(url),
                escape_html(url)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders generated and fallback articles through one template
#[derive(Debug, Clone, Default)]
pub struct ArticleRenderer {
    template: ArticleTemplate,
}

impl ArticleRenderer {
    pub fn new(template: ArticleTemplate) -> Self {
        Self { template }
    }

    /// Article for generated text
    pub fn render_generated(&self, query: &str, markdown: &str, links: &LinkSet) -> String {
        self.template.fill(
            &escape_html(query),
            &render_markdown(markdown),
            &reference_list(query, links),
        )
    }

    /// Article for a query with no links and no generated text
    pub fn render_fallback(&self, query: &str) -> String {
        let references = if is_math_expression(query) {
            NO_FURTHER_READING
        } else {
            NO_REFERENCES_FOUND
        };
        self.template
            .fill(&escape_html(query), NO_RESULTS_BODY, references)
    }
}
