// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query normalisation and output escaping
//!
//! A [`Slug`] is the filesystem- and URL-safe key derived from a raw query.
//! It only ever contains `[a-z0-9-]`, never starts or ends with `-` and never
//! holds two consecutive dashes, so it cannot express a path separator or a
//! `..` traversal.

use std::fmt;

/// Normalised, filesystem-safe form of a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from raw query text
    ///
    /// Lowercases, replaces every character outside `[a-z0-9 ]` with a space,
    /// collapses whitespace runs and joins the words with `-`. Returns `None`
    /// when nothing survives normalisation.
    pub fn from_query(query: &str) -> Option<Self> {
        let replaced: String = query
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let slug = replaced.split_whitespace().collect::<Vec<_>>().join("-");
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug))
        }
    }

    /// Accept a path segment only if it is already a canonical slug
    pub fn from_path(segment: &str) -> Option<Self> {
        let slug = Self::from_query(segment)?;
        if slug.0 == segment {
            Some(slug)
        } else {
            None
        }
    }

    /// The slug text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Query text recovered from the slug (dashes become spaces)
    pub fn to_query(&self) -> String {
        self.0.replace('-', " ")
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Escape text for embedding in HTML element content or a quoted attribute
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a URL for use inside a double-quoted `href` attribute
///
/// Unlike [`escape_html`] this leaves `/` alone so links stay readable.
pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
