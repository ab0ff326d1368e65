//! Reference HTTP fetch engine
//!
//! This engine fetches pages with a plain HTTP client and converts HTML to
//! Markdown locally. It does not execute JavaScript: the `headless` option is
//! accepted for contract compatibility with rendering engines and only logged.

use crate::config::FetchConfig;
use crate::fetch::parser::extract_links;
use crate::fetch::{FetchEngine, FetchOptions, FetchResult};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Body of a successfully retrieved page, before it is turned into a result
struct RenderedPage {
    content: String,
    links: Option<Vec<String>>,
}

/// Builds an HTTP client from the fetch configuration
///
/// # Example
///
/// ```no_run
/// use sumi_scribe::config::FetchConfig;
/// use sumi_scribe::fetch::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch engine backed by reqwest, scraper and htmd
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
}

impl HttpEngine {
    /// Creates an engine with a client built from `config`
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates an engine around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, url: &str, options: &FetchOptions) -> Result<RenderedPage, String> {
        let mut request = self.client.get(url);
        if options.bypass_cache {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request.send().await.map_err(|e| classify_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let final_url = response.url().clone();
        if final_url.as_str() != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let kind = BodyKind::from_content_type(&content_type)
            .ok_or_else(|| format!("unsupported content type: {}", content_type))?;

        let body = response.text().await.map_err(|e| classify_error(&e))?;

        let discover_links = options.discover_links;
        tokio::task::spawn_blocking(move || render_body(kind, &body, &final_url, discover_links))
            .await
            .map_err(|e| format!("render task failed: {}", e))?
    }
}

/// Converts a response body to page content and, if asked, its links
///
/// An empty rendition is still returned: a page with no text can carry the
/// links a crawl depends on.
fn render_body(
    kind: BodyKind,
    body: &str,
    final_url: &Url,
    discover_links: bool,
) -> Result<RenderedPage, String> {
    match kind {
        BodyKind::Html => {
            let content =
                htmd::convert(body).map_err(|e| format!("markdown conversion failed: {}", e))?;
            let links = discover_links.then(|| extract_links(body, final_url));
            Ok(RenderedPage { content, links })
        }
        BodyKind::Text => Ok(RenderedPage {
            content: body.to_string(),
            links: discover_links.then(Vec::new),
        }),
    }
}

#[async_trait]
impl FetchEngine for HttpEngine {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult {
        if options.headless {
            tracing::trace!("HTTP engine ignores headless rendering for {}", url);
        }

        match self.fetch_page(url, options).await {
            Ok(page) => FetchResult::Success {
                url: url.to_string(),
                content: page.content,
                links: page.links,
            },
            Err(reason) => FetchResult::failure(url, reason),
        }
    }
}

/// How a response body is turned into content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    Text,
}

impl BodyKind {
    /// A missing content type is treated as HTML
    fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.is_empty()
            || content_type.contains("text/html")
            || content_type.contains("application/xhtml+xml")
        {
            Some(Self::Html)
        } else if content_type.starts_with("text/plain") || content_type.starts_with("text/markdown")
        {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// Turns a transport error into a short failure reason
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        format!("redirect error: {}", error)
    } else {
        error.to_string()
    }
}
