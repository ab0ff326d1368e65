//! Run summary and reports
//!
//! A run always ends with a [`RunSummary`]: how many targets were attempted,
//! which artifacts were written and every failure with its reason.

use crate::crawler::CrawlPhase;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// How the initial target set was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// A single seed fetched first, its links discovered and followed
    Discovery,
    /// A fixed list of pages
    List,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Why a target produced no artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The page was fetched but rendered to no content, so nothing was saved
    EmptyContent,
    /// A page fetch failed
    PageFetch,
    /// The page was fetched but its artifact could not be written
    Write,
    /// The run stopped before the target finished
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EmptyContent => "empty content",
            Self::PageFetch => "page fetch",
            Self::Write => "write",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A target that produced no artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTarget {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// An artifact written during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub url: String,
    pub path: PathBuf,
}

/// Outcome of a whole crawl run
///
/// Artifacts and failures are listed in dispatch order, independent of the
/// order in which fetches completed.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: CrawlMode,
    pub phase: CrawlPhase,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub artifacts: Vec<SavedArtifact>,
    pub failures: Vec<FailedTarget>,
    pub cancelled: bool,
    pub config_hash: Option<String>,
}

impl RunSummary {
    /// Number of targets the run dealt with
    pub fn attempted(&self) -> usize {
        self.succeeded() + self.failed()
    }

    pub fn succeeded(&self) -> usize {
        self.artifacts.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every attempted target produced an artifact
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted() == 0 {
            0.0
        } else {
            (self.succeeded() as f64 / self.attempted() as f64) * 100.0
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Failure reasons keyed by URL, in dispatch order
    pub fn failure_list(&self) -> Vec<(&str, &str)> {
        self.failures
            .iter()
            .map(|f| (f.url.as_str(), f.reason.as_str()))
            .collect()
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Mode: {}", summary.mode);
    println!("Duration: {:.2}s", summary.duration_seconds());
    if summary.cancelled {
        println!("Run was cancelled before all pages finished");
    }
    println!();

    println!("Attempted: {}", summary.attempted());
    println!("Succeeded: {}", summary.succeeded());
    println!("Failed: {}", summary.failed());
    println!();

    if !summary.failures.is_empty() {
        println!("Failures:");
        for failure in &summary.failures {
            println!("  - {} [{}]: {}", failure.url, failure.kind, failure.reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages saved)",
        summary.success_rate(),
        summary.succeeded(),
        summary.attempted()
    );
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Scribe Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Mode**: {}\n", summary.mode));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Final Phase**: {:?}\n", summary.phase));
    if summary.cancelled {
        md.push_str("- **Cancelled**: yes\n");
    }
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Attempted**: {}\n", summary.attempted()));
    md.push_str(&format!("- **Succeeded**: {}\n", summary.succeeded()));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.artifacts.is_empty() {
        md.push_str("## Saved Pages\n\n");
        md.push_str("| URL | File |\n");
        md.push_str("|-----|------|\n");
        for artifact in &summary.artifacts {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&artifact.url),
                artifact.path.display()
            ));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Kind | Reason |\n");
        md.push_str("|-----|------|--------|\n");
        for failure in &summary.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&failure.url),
                failure.kind,
                escape_cell(&failure.reason)
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes characters that would break a markdown table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Writes the markdown summary to `output_path`
///
/// The report is written to a temporary file next to `output_path` and
/// renamed into place, so an existing report is never left half written.
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(markdown.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(output_path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> RunSummary {
        let started_at = Utc::now();
        RunSummary {
            mode: CrawlMode::List,
            phase: CrawlPhase::Completed,
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(1500),
            artifacts: vec![SavedArtifact {
                url: "https://example.com/a".to_string(),
                path: PathBuf::from("crawled_pages/a.md"),
            }],
            failures: vec![FailedTarget {
                url: "https://example.com/b".to_string(),
                kind: FailureKind::PageFetch,
                reason: "timeout".to_string(),
            }],
            cancelled: false,
            config_hash: Some("abc123".to_string()),
        }
    }

    #[test]
    fn test_counts() {
        let summary = sample_summary();
        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_clean());
        assert!((summary.success_rate() - 50.0).abs() < f64::EPSILON);
        assert!((summary.duration_seconds() - 1.5).abs() < 1e-9);
        assert_eq!(
            summary.failure_list(),
            vec![("https://example.com/b", "timeout")]
        );
    }

    #[test]
    fn test_empty_summary_rate() {
        let mut summary = sample_summary();
        summary.artifacts.clear();
        summary.failures.clear();
        assert_eq!(summary.attempted(), 0);
        assert_eq!(summary.success_rate(), 0.0);
        assert!(summary.is_clean());
    }

    #[test]
    fn test_markdown_contains_failures() {
        let md = format_markdown_summary(&sample_summary());

        assert!(md.contains("# Sumi-Scribe Crawl Summary"));
        assert!(md.contains("- **Attempted**: 2"));
        assert!(md.contains("| https://example.com/a | crawled_pages/a.md |"));
        assert!(md.contains("| https://example.com/b | page fetch | timeout |"));
        assert!(md.contains("- **Config Hash**: abc123"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reports").join("summary.md");

        generate_markdown_summary(&sample_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Failures"));
    }

    #[test]
    fn test_generate_markdown_summary_replaces_report() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("summary.md");
        std::fs::write(&path, "stale report").unwrap();

        generate_markdown_summary(&sample_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale report"));
        assert!(written.starts_with("# Sumi-Scribe Crawl Summary"));

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_markdown_escapes_table_cells() {
        let mut summary = sample_summary();
        summary.failures[0].url = "https://example.com/a|b".to_string();
        summary.failures[0].reason = "bad | worse".to_string();

        let md = format_markdown_summary(&summary);

        assert!(md.contains("| https://example.com/a\\|b | page fetch | bad \\| worse |"));
    }
}
