//! Sumi-Scribe: a domain-scoped site snapshotter
//!
//! This crate crawls a single site (or a fixed list of pages), converts every
//! page to Markdown and writes one artifact file per page.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed seed URL '{url}': {reason}")]
    MalformedSeed { url: String, reason: String },

    #[error("Failed to fetch seed {url}: {reason}")]
    SeedFetch { url: String, reason: String },

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crawler::CrawlPhase,
        to: crawler::CrawlPhase,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Report error: {0}")]
    Report(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlPhase, CrawlSettings, Coordinator, Seed};
pub use fetch::{FetchEngine, FetchOptions, FetchResult, HttpEngine};
pub use output::{ArtifactWriter, RunSummary};
pub use crate::url::{artifact_file_name, filter_links, normalize_target, TargetSet};
