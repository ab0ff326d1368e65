//! Configuration module for Sumi-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Writing pages to: {}", config.output.directory);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, SeedConfig, DEFAULT_EXTENSION,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_OUTPUT_DIR,
};
pub use validation::{validate, MAX_CONCURRENCY_LIMIT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
