//! Output module for crawl artifacts and reports
//!
//! This module handles:
//! - Writing one Markdown artifact per fetched page
//! - Collecting the run summary
//! - Printing and exporting the summary

mod summary;
mod writer;

pub use summary::{
    format_markdown_summary, generate_markdown_summary, print_summary, CrawlMode, FailedTarget,
    FailureKind, RunSummary, SavedArtifact,
};
pub use writer::{render_artifact, ArtifactWriter, WriteError};
