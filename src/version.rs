// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Infintium server

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Full version string reported by `/health`
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Supported link sources in this build
pub const LINK_SOURCES: &[&str] = &["scrape", "brave", "script"];
