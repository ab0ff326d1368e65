//! Crawler module for seed resolution and fetch orchestration
//!
//! This module contains the core crawling logic, including:
//! - Seed and settings resolution from configuration
//! - The crawl phase state machine
//! - Bounded-concurrency dispatch and per-page result routing

mod coordinator;
mod phase;

pub use coordinator::Coordinator;
pub use phase::CrawlPhase;

use crate::config::{Config, SeedConfig};
use crate::fetch::HttpEngine;
use crate::output::{CrawlMode, RunSummary};
use crate::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Where a crawl starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Fetch this page, then every in-scope page it links to
    Domain(String),
    /// Fetch exactly these pages
    List(Vec<String>),
}

impl Seed {
    /// Builds the seed from the `[seed]` configuration section
    pub fn from_config(config: &SeedConfig) -> Result<Self, ConfigError> {
        match (&config.domain, &config.urls) {
            (Some(domain), None) => Ok(Self::Domain(domain.clone())),
            (None, Some(urls)) => Ok(Self::List(urls.clone())),
            _ => Err(ConfigError::Validation(
                "seed must set exactly one of 'domain' or 'urls'".to_string(),
            )),
        }
    }

    pub fn mode(&self) -> CrawlMode {
        match self {
            Self::Domain(_) => CrawlMode::Discovery,
            Self::List(_) => CrawlMode::List,
        }
    }
}

/// Everything the coordinator needs to know about a run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed: Seed,

    /// Prefix discovered links must start with; defaults to the seed
    pub scope_prefix: Option<String>,

    pub output_dir: PathBuf,

    /// Artifact extension without the dot
    pub extension: String,

    /// Maximum number of fetches in flight at once
    pub max_concurrency: usize,

    pub bypass_cache: bool,

    pub headless: bool,

    /// Cancel the run once this much time has passed
    pub run_timeout: Option<Duration>,
}

impl CrawlSettings {
    /// Settings with the default output location and limits
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            scope_prefix: None,
            output_dir: PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR),
            extension: crate::config::DEFAULT_EXTENSION.to_string(),
            max_concurrency: crate::config::DEFAULT_MAX_CONCURRENCY as usize,
            bypass_cache: true,
            headless: true,
            run_timeout: None,
        }
    }

    /// Builds settings from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            seed: Seed::from_config(&config.seed)?,
            scope_prefix: config.seed.scope_prefix.clone(),
            output_dir: PathBuf::from(&config.output.directory),
            extension: config.output.extension.clone(),
            max_concurrency: config.crawler.max_concurrency as usize,
            bypass_cache: config.crawler.cache_bypass,
            headless: config.fetch.headless,
            run_timeout: config.crawler.run_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Runs a complete crawl with the reference HTTP engine
///
/// This is the main entry point for the CLI. It will:
/// 1. Build the HTTP fetch engine
/// 2. Resolve and validate the seed
/// 3. Fetch the seed and discover links (discovery mode)
/// 4. Fetch every target with bounded concurrency and write artifacts
/// 5. Return the run summary
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, recorded in the summary
/// * `cancel` - Token that stops the run early when cancelled
pub async fn crawl(
    config: Config,
    config_hash: Option<String>,
    cancel: CancellationToken,
) -> crate::Result<RunSummary> {
    let engine = HttpEngine::new(&config.fetch)?;
    let settings = CrawlSettings::from_config(&config)?;

    let mut coordinator = Coordinator::new(settings, Arc::new(engine))?;
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    coordinator.run_with_cancel(cancel).await
}
