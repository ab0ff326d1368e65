//! Fetch engine boundary
//!
//! The crawl core never talks to the network directly. It hands one URL at a
//! time to a [`FetchEngine`] and always receives a typed [`FetchResult`]
//! back. This module contains:
//! - The engine trait and its request options
//! - The reference HTTP engine (reqwest + scraper + htmd)
//! - HTML link extraction used by the HTTP engine

mod http;
mod parser;

pub use http::{build_http_client, HttpEngine};
pub use parser::extract_links;

use async_trait::async_trait;

/// Per-request options passed to the fetch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ask for fresh content, skipping any cache the engine keeps
    pub bypass_cache: bool,

    /// Ask for headless/automated rendering
    pub headless: bool,

    /// Return the links found on the page along with its content
    pub discover_links: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            bypass_cache: true,
            headless: true,
            discover_links: false,
        }
    }
}

impl FetchOptions {
    /// Same options with link discovery turned on
    pub fn with_links(self) -> Self {
        Self {
            discover_links: true,
            ..self
        }
    }
}

/// Outcome of fetching a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The page was retrieved and rendered
    Success {
        /// The URL that was requested
        url: String,
        /// Normalized page content (Markdown for the HTTP engine); may be
        /// empty when the page has no text
        content: String,
        /// Links found on the page, when discovery was requested
        links: Option<Vec<String>>,
    },

    /// The page could not be retrieved
    Failure {
        /// The URL that was requested
        url: String,
        /// Human-readable failure reason
        reason: String,
    },
}

impl FetchResult {
    pub fn failure(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failure {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// A component that turns a URL into page content and, optionally, links
///
/// Implementations must report every problem with a single URL as
/// [`FetchResult::Failure`] rather than panicking or returning early.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Fetches one URL
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult;
}
