//! Output module for crawl results
//!
//! This module handles:
//! - Writing fetched pages as markdown files with frontmatter
//! - Grouping pages with duplicate titles into folders
//! - Generating the failed-URL list and run summary

mod duplicates;
pub mod frontmatter;
pub mod report;
mod summary;
mod writer;

pub use duplicates::{classify_duplicates, folder_name_for_title, DuplicateGroup, DuplicateReport};
pub use frontmatter::{parse_document, render_document, Document};
pub use report::{report_timestamp, ReportGenerator, FAILED_URLS_FILE, SUMMARY_FILE};
pub use summary::{CrawlSummary, ProgressSnapshot};
pub use writer::ContentWriter;

use crate::UrlError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot derive output path: {0}")]
    Url(#[from] UrlError),

    #[error("Output directory does not exist: {}", .0.display())]
    MissingOutputDir(PathBuf),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
