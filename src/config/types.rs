use serde::Deserialize;

/// Default output directory for artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "crawled_pages";

/// Default artifact extension (Markdown)
pub const DEFAULT_EXTENSION: &str = "md";

/// Default number of simultaneous fetches
pub const DEFAULT_MAX_CONCURRENCY: u32 = 8;

/// Main configuration structure for Sumi-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub seed: SeedConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the crawl starts
///
/// Exactly one of `domain` (discovery mode) or `urls` (list mode) must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedConfig {
    /// Homepage to fetch and discover links from
    pub domain: Option<String>,

    /// Explicit list of pages to fetch
    pub urls: Option<Vec<String>>,

    /// Prefix a discovered link must start with; defaults to the seed itself
    pub scope_prefix: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Always ask for fresh, non-cached content
    #[serde(default = "default_true")]
    pub cache_bypass: bool,

    /// Stop the run after this many seconds
    pub run_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache_bypass: true,
            run_timeout_secs: None,
        }
    }
}

/// Fetch engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Request headless/automated rendering from the engine
    #[serde(default = "default_true")]
    pub headless: bool,

    /// User agent override
    pub user_agent: Option<String>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl FetchConfig {
    /// Returns the configured user agent, or `sumi-scribe/<version>`
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("sumi-scribe/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving one file per page
    #[serde(default = "default_output_dir")]
    pub directory: String,

    /// Artifact file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Optional path for a Markdown run report
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            extension: default_extension(),
            summary_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> u32 {
    DEFAULT_MAX_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
