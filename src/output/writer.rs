//! Content writer
//!
//! Saves one fetched page as `<dir>/<domain>_<path>.md`, overwriting any
//! earlier file for the same URL.

use crate::crawler::PageRecord;
use crate::output::frontmatter::render_document;
use crate::output::OutputResult;
use crate::url::{derive_file_name, extract_domain};
use crate::UrlError;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes page records into one output directory
#[derive(Debug, Clone)]
pub struct ContentWriter {
    dir: PathBuf,
}

impl ContentWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a record with this resolved URL would be written to
    pub fn path_for(&self, resolved_url: &str) -> OutputResult<PathBuf> {
        Ok(self.dir.join(derive_file_name(resolved_url)?))
    }

    /// Writes a record and returns the file path
    ///
    /// The file name and the `domain` field both come from the record's
    /// resolved URL. The output directory is created if needed.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the record was written
    /// * `Err(OutputError::Url)` - The resolved URL has no usable host
    /// * `Err(OutputError::Io)` - The directory or file could not be written
    pub fn write(&self, record: &PageRecord) -> OutputResult<PathBuf> {
        let resolved = record.resolved_url();
        let path = self.path_for(resolved)?;

        let parsed = Url::parse(resolved.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", resolved, e)))?;
        let domain = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, render_document(record, &domain))?;

        tracing::info!(path = %path.display(), "Saved page");
        Ok(path)
    }
}
