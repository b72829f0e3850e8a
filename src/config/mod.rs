//! Configuration module for Sitemap-Reader
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_reader::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Retries per URL: {}", config.reader.retry_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, KnowledgeBaseConfig, OutputConfig, ReaderConfig, EU_READER_ENDPOINT,
    GLOBAL_READER_ENDPOINT, PLACEHOLDER_API_KEY,
};

// Re-export parser functions
pub use parser::{
    apply_env_credentials, compute_config_hash, load_config, load_config_with_hash, parse_config,
    KB_API_KEY_ENV, READER_API_KEY_ENV,
};
