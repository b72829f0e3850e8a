//! Sitemap handling module
//!
//! Turns the configured target into the ordered list of page URLs to crawl.
//! A target ending in `.xml` is fetched and parsed as a sitemap; anything
//! else is treated as a single page URL.

mod parser;

pub use parser::{parse_sitemap, SITEMAP_NAMESPACE};

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Timeout for the sitemap GET
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while resolving a sitemap; both abort the crawl
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to parse sitemap: {0}")]
    Parse(String),
}

/// Returns true if the target should be treated as a sitemap document
pub fn is_sitemap_target(target: &str) -> bool {
    target.trim().ends_with(".xml")
}

/// Builds the HTTP client used for sitemap downloads
pub fn build_sitemap_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("sitemap-reader/", env!("CARGO_PKG_VERSION")))
        .timeout(SITEMAP_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Resolves a target into the ordered list of page URLs
///
/// No retries happen here: a failed sitemap download is surfaced to the
/// caller, which aborts the crawl.
///
/// # Arguments
///
/// * `client` - HTTP client for the sitemap GET
/// * `target` - Sitemap URL or single page URL
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Page URLs in document order (may be empty)
/// * `Err(SitemapError::Network)` - The GET failed or returned a non-success status
/// * `Err(SitemapError::Parse)` - The body is not well-formed XML
pub async fn resolve_targets(client: &Client, target: &str) -> Result<Vec<String>, SitemapError> {
    let target = target.trim();

    if !is_sitemap_target(target) {
        tracing::info!(url = %target, "Single page target, not a sitemap");
        return Ok(vec![target.to_string()]);
    }

    tracing::info!(url = %target, "Fetching sitemap");

    let network_error = |message: String| SitemapError::Network {
        url: target.to_string(),
        message,
    };

    let response = client
        .get(target)
        .timeout(SITEMAP_TIMEOUT)
        .send()
        .await
        .map_err(|e| network_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(network_error(format!("HTTP {}", status.as_u16())));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| network_error(e.to_string()))?;

    let urls = parse_sitemap(&body)?;
    tracing::info!(count = urls.len(), "Found URLs in sitemap");

    Ok(urls)
}
