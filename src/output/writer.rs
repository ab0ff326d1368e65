//! Artifact writer
//!
//! Persists one file per fetched page. Every write goes through a temporary
//! file in the output directory that is renamed into place, so a reader never
//! observes a truncated artifact and a rerun simply replaces the old file.

use crate::url::artifact_file_name_str;
use crate::UrlError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while persisting an artifact
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot name artifact for {url}: {source}")]
    InvalidUrl { url: String, source: UrlError },
}

/// Renders the provenance header followed by the page content
pub fn render_artifact(url: &str, content: &str) -> String {
    format!("---\nURL: {}\n---\n\n{}", url, content)
}

/// Writes page artifacts into a single output directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    extension: String,
}

impl ArtifactWriter {
    /// Creates a writer; nothing touches the filesystem until the first write
    pub fn new(output_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if it is missing
    ///
    /// Safe to call repeatedly and from several threads at once.
    pub fn ensure_dir(&self) -> Result<(), WriteError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| WriteError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Path the artifact for `url` is written to
    pub fn path_for(&self, url: &str) -> Result<PathBuf, WriteError> {
        let file_name =
            artifact_file_name_str(url, &self.extension).map_err(|source| WriteError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;
        Ok(self.output_dir.join(file_name))
    }

    /// Writes the artifact for `url`, replacing any previous version
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written artifact
    /// * `Err(WriteError)` - Directory creation or the write failed
    pub fn write(&self, url: &str, content: &str) -> Result<PathBuf, WriteError> {
        let path = self.path_for(url)?;
        self.ensure_dir()?;

        let as_write_error = |source| WriteError::Write {
            path: path.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.output_dir).map_err(as_write_error)?;
        file.write_all(render_artifact(url, content).as_bytes())
            .map_err(as_write_error)?;
        file.as_file().sync_all().map_err(as_write_error)?;
        file.persist(&path).map_err(|e| as_write_error(e.error))?;

        tracing::info!("Saved: {}", path.display());
        Ok(path)
    }
}
