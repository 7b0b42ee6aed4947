// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Article page template with `{{title}}`, `{{content}}` and `{{urls}}`

use std::path::Path;
use tracing::{debug, warn};

/// Built-in article template, used when the views directory has none
pub const DEFAULT_ARTICLE_TEMPLATE: &str = include_str!("../../views/template.html");

/// Built-in entry page
pub const DEFAULT_INDEX_PAGE: &str = include_str!("../../views/index.html");

/// Placeholder-substitution template for article pages
#[derive(Debug, Clone)]
pub struct ArticleTemplate {
    source: String,
}

impl ArticleTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load `template.html` from `views_dir`, falling back to the built-in one
    pub fn load(views_dir: &Path) -> Self {
        Self::new(load_view(views_dir, "template.html", DEFAULT_ARTICLE_TEMPLATE))
    }

    /// Substitute every placeholder occurrence in one pass
    ///
    /// Values are inserted as-is, so placeholder-looking text inside a value
    /// is never expanded again. Callers escape their values.
    pub fn fill(&self, title: &str, content: &str, urls: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + content.len() + urls.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start..];
            let (value, consumed) = if after.starts_with("{{title}}") {
                (Some(title), "{{title}}".len())
            } else if after.starts_with("{{content}}") {
                (Some(content), "{{content}}".len())
            } else if after.starts_with("{{urls}}") {
                (Some(urls), "{{urls}}".len())
            } else {
                (None, 2)
            };
            match value {
                Some(v) => out.push_str(v),
                None => out.push_str("{{"),
            }
            rest = &after[consumed..];
        }
        out.push_str(rest);
        out
    }
}

impl Default for ArticleTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_ARTICLE_TEMPLATE)
    }
}

/// Read a view file, or return `default` when it is missing or unreadable
pub fn load_view(views_dir: &Path, name: &str, default: &str) -> String {
    let path = views_dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            debug!("Loaded view {}", path.display());
            contents
        }
        Err(e) => {
            if path.exists() {
                warn!("Failed to read view {}: {}, using built-in", path.display(), e);
            } else {
                debug!("View {} not found, using built-in", path.display());
            }
            default.to_string()
        }
    }
}
