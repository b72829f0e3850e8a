//! Reader API fetcher
//!
//! This module turns one page URL into exactly one [`FetchOutcome`]. It owns
//! every retry decision so callers never see transient states:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Timeout / connection failure | Retry after 2s while attempts remain |
//! | HTTP status >= 400 | Retry after 2s while attempts remain |
//! | Body is not JSON | Fail immediately → InvalidResponse |
//! | `warning` mentions a cached snapshot | One forced no-cache request after 1s |
//! | Forced request still cached or fails | StaleContent |
//!
//! Total attempts are `retry_count + 1`. The cache-busting request is not
//! counted against that budget.

use crate::config::ReaderConfig;
use crate::crawler::response::{PageRecord, ReaderRequest, ReaderResponse};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Wait between attempts after a transport or HTTP failure
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Wait before the forced no-cache request
pub const CACHE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Render budget passed to the reader, in seconds
const READER_RENDER_TIMEOUT: &str = "30";

const X_RETURN_FORMAT: &str = "x-return-format";
const X_RETAIN_IMAGES: &str = "x-retain-images";
const X_ENGINE: &str = "x-engine";
const X_TIMEOUT: &str = "x-timeout";
const X_NO_CACHE: &str = "x-no-cache";
const X_REMOVE_SELECTOR: &str = "x-remove-selector";
const X_WAIT_FOR_SELECTOR: &str = "x-wait-for-selector";

/// Why a URL could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection error")]
    ConnectionError,

    #[error("HTTP {0}")]
    HttpError(u16),

    #[error("response body is not valid JSON")]
    InvalidResponse,

    #[error("reader kept serving a cached snapshot")]
    StaleContent,
}

/// Result of fetching one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(PageRecord),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Result of a single request to the reader
enum Attempt {
    /// Body parsed as a reader response
    Parsed(ReaderResponse),
    /// Transport or HTTP failure; may be retried
    Transient(FetchFailure),
    /// Body arrived but is not JSON
    Invalid,
}

/// Client for the reader API
///
/// Holds the per-request headers built from configuration and the retry
/// budget. One instance is reused for every URL of a crawl.
#[derive(Debug, Clone)]
pub struct ReaderClient {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
    no_cache: bool,
    with_metadata: bool,
    total_attempts: u32,
    backoff: Duration,
    cache_retry_delay: Duration,
}

impl ReaderClient {
    /// Builds a reader client from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The reader configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ReaderClient)` - Ready to fetch
    /// * `Err(ConfigError)` - A selector cannot be sent as a header, or the
    ///   HTTP client could not be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitemap_reader::config::ReaderConfig;
    /// use sitemap_reader::crawler::ReaderClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = ReaderClient::new(&ReaderConfig::default())?;
    /// let outcome = reader.fetch("https://example.com/").await;
    /// println!("success: {}", outcome.is_success());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &ReaderConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(concat!("sitemap-reader/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ConfigError::Validation(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint().to_string(),
            headers: build_headers(config)?,
            no_cache: config.no_cache,
            with_metadata: config.exposes_metadata(),
            total_attempts: config.retry_count.saturating_add(1),
            backoff: RETRY_BACKOFF,
            cache_retry_delay: CACHE_RETRY_DELAY,
        })
    }

    /// Overrides the retry and cache-busting waits
    pub fn with_backoff(mut self, backoff: Duration, cache_retry_delay: Duration) -> Self {
        self.backoff = backoff;
        self.cache_retry_delay = cache_retry_delay;
        self
    }

    /// Number of attempts made before giving up on transient failures
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches one URL through the reader
    ///
    /// Never returns an error: every failure is folded into
    /// [`FetchOutcome::Failure`].
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let total = self.total_attempts;
        let mut attempt = 1;

        loop {
            tracing::debug!(url = %url, attempt, total, "Requesting page from reader");

            match self.send_once(url, self.no_cache).await {
                Attempt::Parsed(response) => return self.finish(url, response).await,
                Attempt::Invalid => {
                    tracing::warn!(url = %url, attempt, "Invalid JSON response");
                    return FetchOutcome::Failure(FetchFailure::InvalidResponse);
                }
                Attempt::Transient(failure) if attempt < total => {
                    tracing::warn!(
                        url = %url,
                        attempt,
                        total,
                        error = %failure,
                        "Fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Attempt::Transient(failure) => {
                    tracing::warn!(
                        url = %url,
                        attempts = total,
                        error = %failure,
                        "Fetch failed after all attempts"
                    );
                    return FetchOutcome::Failure(failure);
                }
            }
        }
    }

    /// Applies the cache-busting check and normalizes the response
    async fn finish(&self, url: &str, response: ReaderResponse) -> FetchOutcome {
        let response = if response.is_cached_snapshot() && !self.no_cache {
            tracing::warn!(url = %url, "Cached snapshot detected, retrying with fresh fetch");
            tokio::time::sleep(self.cache_retry_delay).await;

            match self.send_once(url, true).await {
                Attempt::Parsed(fresh) if !fresh.is_cached_snapshot() => fresh,
                Attempt::Parsed(_) => {
                    tracing::warn!(url = %url, "Still getting cached content after fresh fetch");
                    return FetchOutcome::Failure(FetchFailure::StaleContent);
                }
                Attempt::Transient(failure) => {
                    tracing::warn!(url = %url, error = %failure, "Fresh fetch failed");
                    return FetchOutcome::Failure(FetchFailure::StaleContent);
                }
                Attempt::Invalid => {
                    tracing::warn!(url = %url, "Invalid JSON response on fresh fetch");
                    return FetchOutcome::Failure(FetchFailure::StaleContent);
                }
            }
        } else {
            response
        };

        let record = PageRecord::from_response(
            url,
            response,
            self.with_metadata,
            chrono::Utc::now().timestamp(),
        );
        tracing::debug!(url = %url, title = %record.title(), "Fetched page");

        FetchOutcome::Success(record)
    }

    /// Sends one request and classifies the result
    async fn send_once(&self, url: &str, no_cache: bool) -> Attempt {
        let mut headers = self.headers.clone();
        if no_cache {
            headers.insert(
                HeaderName::from_static(X_NO_CACHE),
                HeaderValue::from_static("true"),
            );
        }

        let response = match self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&ReaderRequest { url })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Transient(classify_transport_error(&e)),
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return Attempt::Transient(FetchFailure::HttpError(status.as_u16()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Attempt::Transient(classify_transport_error(&e)),
        };

        match serde_json::from_slice::<ReaderResponse>(&body) {
            Ok(parsed) => Attempt::Parsed(parsed),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Failed to decode reader response");
                Attempt::Invalid
            }
        }
    }
}

/// Maps a reqwest error to a failure kind
fn classify_transport_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::ConnectionError
    }
}

/// Builds the headers sent with every reader request
fn build_headers(config: &ReaderConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(X_RETURN_FORMAT),
        HeaderValue::from_static("markdown"),
    );
    headers.insert(
        HeaderName::from_static(X_RETAIN_IMAGES),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static(X_ENGINE),
        HeaderValue::from_static("browser"),
    );
    headers.insert(
        HeaderName::from_static(X_TIMEOUT),
        HeaderValue::from_static(READER_RENDER_TIMEOUT),
    );

    if let Some(key) = config.effective_api_key() {
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", key), "api_key")?);
    }

    if let Some(selector) = non_blank(&config.css_selector) {
        headers.insert(
            HeaderName::from_static(X_REMOVE_SELECTOR),
            header_value(selector, "css_selector")?,
        );
    }

    if let Some(selector) = non_blank(&config.wait_for_selector) {
        headers.insert(
            HeaderName::from_static(X_WAIT_FOR_SELECTOR),
            header_value(selector, "wait_for_selector")?,
        );
    }

    Ok(headers)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn header_value(value: &str, field: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!(
            "{} contains characters that cannot be sent in an HTTP header",
            field
        ))
    })
}
