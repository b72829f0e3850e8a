//! Knowledge-base import
//!
//! Pushes a crawl's markdown files into a Dify-compatible knowledge base.
//! The only contract shared with the crawler is the frontmatter format.
//!
//! # Components
//!
//! - `KnowledgeBaseClient`: REST calls for datasets, metadata and documents
//! - `Importer`: walks an output directory and imports each file
//! - `types`: request and response bodies

mod client;
mod importer;
pub mod types;

pub use client::KnowledgeBaseClient;
pub use importer::{ImportSummary, Importer, IMPORT_PAUSE};
pub use types::{FieldType, MetadataField, MetadataValue};

use thiserror::Error;

/// Errors raised by knowledge-base calls
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Missing field in response or configuration: {0}")]
    MissingField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for knowledge-base operations
pub type KnowledgeBaseResult<T> = Result<T, KnowledgeBaseError>;
