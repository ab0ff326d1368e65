//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe site snapshotter.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sumi_scribe::config::{load_config_with_hash, validate, Config};
use sumi_scribe::crawler::crawl;
use sumi_scribe::output::{generate_markdown_summary, print_summary, RunSummary};
use sumi_scribe::ScribeError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: a domain-scoped site snapshotter
///
/// Sumi-Scribe fetches a seed page, follows every link that stays under the
/// seed's prefix and writes each page as a Markdown file. It can also fetch
/// a fixed list of pages instead.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version)]
#[command(about = "A domain-scoped site snapshotter", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Crawl from this seed URL instead of the configured seed
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Write artifacts to this directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Override the maximum number of fetches in flight
    #[arg(long, value_name = "N")]
    max_concurrency: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if apply_overrides(&mut config, &cli) {
        validate(&config).context("Invalid command-line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let summary = handle_crawl(config.clone(), config_hash).await?;

    if let Some(path) = &config.output.summary_path {
        export_summary(&summary, Path::new(path))?;
    }

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides; returns true if anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;

    if let Some(seed) = &cli.seed {
        config.seed.domain = Some(seed.clone());
        config.seed.urls = None;
        config.seed.scope_prefix = None;
        changed = true;
    }

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
        changed = true;
    }

    if let Some(limit) = cli.max_concurrency {
        config.crawler.max_concurrency = limit;
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Scribe Dry Run ===\n");

    println!("Seed:");
    if let Some(domain) = &config.seed.domain {
        println!("  Mode: discovery");
        println!("  Seed URL: {}", domain);
        println!(
            "  Scope prefix: {}",
            config.seed.scope_prefix.as_deref().unwrap_or(domain)
        );
    }
    if let Some(urls) = &config.seed.urls {
        println!("  Mode: list ({} URLs)", urls.len());
        for url in urls {
            println!("    * {}", url);
        }
    }

    println!("\nCrawler Configuration:");
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!("  Cache bypass: {}", config.crawler.cache_bypass);
    match config.crawler.run_timeout_secs {
        Some(secs) => println!("  Run timeout: {}s", secs),
        None => println!("  Run timeout: none"),
    }

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent());
    println!("  Headless: {}", config.fetch.headless);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetch.max_redirects);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Extension: .{}", config.output.extension);
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> Result<RunSummary, ScribeError> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            on_signal.cancel();
        }
    });

    match crawl(config, Some(config_hash), cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(summary)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}

/// Writes the markdown summary report
fn export_summary(summary: &RunSummary, path: &Path) -> Result<(), ScribeError> {
    generate_markdown_summary(summary, path)
        .map_err(|e| ScribeError::Report(format!("{}: {}", path.display(), e)))?;
    println!("✓ Summary exported to: {}", path.display());
    Ok(())
}
