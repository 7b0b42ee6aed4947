// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Everything is read from environment variables (an optional `.env` file is
//! loaded first by the binary). Unset or unparsable values fall back to the
//! defaults in [`AppConfig::default`].

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Hard upper bound on links per query
pub const MAX_LINKS_CEILING: usize = 10;

/// 24 hours, the default for both cache TTL and sweep period
pub const ONE_DAY_SECS: u64 = 24 * 60 * 60;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Missing required setting {name}")]
    Missing { name: &'static str },
}

/// Which link source implementation serves the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSourceKind {
    /// Scrape a search engine result page
    Scrape,
    /// Hosted search API (Brave)
    Brave,
    /// Local script printing JSON results
    Script,
}

impl LinkSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkSourceKind::Scrape => "scrape",
            LinkSourceKind::Brave => "brave",
            LinkSourceKind::Script => "script",
        }
    }
}

impl FromStr for LinkSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scrape" | "google" => Ok(LinkSourceKind::Scrape),
            "brave" | "api" => Ok(LinkSourceKind::Brave),
            "script" => Ok(LinkSourceKind::Script),
            other => Err(ConfigError::Invalid {
                name: "LINK_SOURCE",
                reason: format!(
                    "unknown link source '{}' (expected one of: {})",
                    other,
                    crate::version::LINK_SOURCES.join(", ")
                ),
            }),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub links: LinkConfig,
    pub generator: GeneratorConfig,
    pub store: StoreConfig,
    pub upstream: UpstreamConfig,
}

/// HTTP surface settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Directory with `index.html` and `template.html`
    pub views_dir: PathBuf,
    /// Per-client ceiling on `POST /search` per rolling minute
    pub rate_limit_per_minute: u32,
    /// Take the client identity from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
    /// Generate missing articles on `GET /articles/{slug}`
    pub generate_on_demand: bool,
}

/// Link source and result cache settings
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub source: LinkSourceKind,
    pub brave_api_key: Option<String>,
    pub script_path: PathBuf,
    pub script_interpreter: String,
    /// LinkSet upper bound (1..=10)
    pub max_links: usize,
    pub cache_ttl_secs: u64,
    /// Cache link sets that came back empty
    pub cache_empty_results: bool,
}

/// Content generator settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

/// Article store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub articles_dir: PathBuf,
    pub sweep_interval_secs: u64,
}

/// Deadlines and retry policy for every external call
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub link_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl UpstreamConfig {
    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl StoreConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl LinkConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
                views_dir: PathBuf::from("views"),
                rate_limit_per_minute: 10,
                trust_forwarded_for: false,
                generate_on_demand: true,
            },
            links: LinkConfig {
                source: LinkSourceKind::Scrape,
                brave_api_key: None,
                script_path: PathBuf::from("scrape.py"),
                script_interpreter: "python3".to_string(),
                max_links: MAX_LINKS_CEILING,
                cache_ttl_secs: ONE_DAY_SECS,
                cache_empty_results: false,
            },
            generator: GeneratorConfig {
                api_key: None,
                model: "gemini-1.5-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
            },
            store: StoreConfig {
                articles_dir: PathBuf::from("public/articles"),
                sweep_interval_secs: ONE_DAY_SECS,
            },
            upstream: UpstreamConfig {
                link_timeout_secs: 10,
                generation_timeout_secs: 60,
                max_attempts: 2,
                retry_base_delay_ms: 500,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(v) => v.parse().map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: format!("{}", e),
            })?,
            Err(_) => defaults.server.bind_addr,
        };

        let source = match env::var("LINK_SOURCE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.links.source,
        };

        Ok(Self {
            server: ServerConfig {
                bind_addr,
                views_dir: env::var("VIEWS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.server.views_dir),
                rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE")
                    .unwrap_or(defaults.server.rate_limit_per_minute),
                trust_forwarded_for: flag_env("TRUST_FORWARDED_FOR")
                    .unwrap_or(defaults.server.trust_forwarded_for),
                generate_on_demand: flag_env("GENERATE_ON_DEMAND")
                    .unwrap_or(defaults.server.generate_on_demand),
            },
            links: LinkConfig {
                source,
                brave_api_key: non_empty_env("BRAVE_API_KEY"),
                script_path: env::var("LINK_SCRIPT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.links.script_path),
                script_interpreter: non_empty_env("LINK_SCRIPT_INTERPRETER")
                    .unwrap_or(defaults.links.script_interpreter),
                max_links: parse_env("MAX_LINKS").unwrap_or(defaults.links.max_links),
                cache_ttl_secs: parse_env("LINK_CACHE_TTL_SECS")
                    .unwrap_or(defaults.links.cache_ttl_secs),
                cache_empty_results: flag_env("CACHE_EMPTY_LINK_SETS")
                    .unwrap_or(defaults.links.cache_empty_results),
            },
            generator: GeneratorConfig {
                api_key: non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("API_KEY")),
                model: non_empty_env("GEMINI_MODEL").unwrap_or(defaults.generator.model),
                endpoint: non_empty_env("GEMINI_ENDPOINT")
                    .unwrap_or(defaults.generator.endpoint),
            },
            store: StoreConfig {
                articles_dir: env::var("ARTICLES_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.store.articles_dir),
                sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS")
                    .unwrap_or(defaults.store.sweep_interval_secs),
            },
            upstream: UpstreamConfig {
                link_timeout_secs: parse_env("LINK_TIMEOUT_SECS")
                    .unwrap_or(defaults.upstream.link_timeout_secs),
                generation_timeout_secs: parse_env("GENERATION_TIMEOUT_SECS")
                    .unwrap_or(defaults.upstream.generation_timeout_secs),
                max_attempts: parse_env("UPSTREAM_MAX_ATTEMPTS")
                    .unwrap_or(defaults.upstream.max_attempts),
                retry_base_delay_ms: parse_env("UPSTREAM_RETRY_BASE_MS")
                    .unwrap_or(defaults.upstream.retry_base_delay_ms),
            },
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.max_links == 0 || self.links.max_links > MAX_LINKS_CEILING {
            return Err(ConfigError::Invalid {
                name: "MAX_LINKS",
                reason: format!("must be between 1 and {}", MAX_LINKS_CEILING),
            });
        }
        if self.links.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "LINK_CACHE_TTL_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.store.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SWEEP_INTERVAL_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.server.rate_limit_per_minute == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_PER_MINUTE",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.upstream.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.upstream.link_timeout_secs == 0 || self.upstream.generation_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "LINK_TIMEOUT_SECS/GENERATION_TIMEOUT_SECS",
                reason: "timeouts must be greater than 0".to_string(),
            });
        }
        if self.links.source == LinkSourceKind::Brave && self.links.brave_api_key.is_none() {
            return Err(ConfigError::Missing {
                name: "BRAVE_API_KEY",
            });
        }
        if self.generator.api_key.is_none() {
            return Err(ConfigError::Missing {
                name: "GEMINI_API_KEY",
            });
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn flag_env(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
