//! Sitemap-Reader: sitemap-driven page capture through a reader API
//!
//! This crate resolves a sitemap (or a single page URL) into a list of pages,
//! fetches each page's rendered markdown through a reader API with retry and
//! cache-busting, writes the results as markdown files with frontmatter,
//! groups duplicate titles into folders, and can import the corpus into a
//! knowledge base.

pub mod config;
pub mod crawler;
pub mod knowledge_base;
pub mod output;
pub mod sitemap;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Reader operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(#[from] knowledge_base::KnowledgeBaseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Start index {index} is out of range (1..={total})")]
    InvalidStartIndex { index: usize, total: usize },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sitemap-Reader operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{FetchFailure, FetchOutcome, PageRecord};
pub use state::{CrawlRun, RunState};
pub use crate::url::{derive_file_stem, extract_domain};
