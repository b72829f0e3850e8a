//! Reader API response shape and normalization
//!
//! The reader answers with `{"data": {...}, "warning"?: "..."}`. Only a
//! handful of fields matter; everything else is ignored.

use serde::{Deserialize, Serialize};

/// Phrase the reader puts in `warning` when it served a cached render
const CACHED_SNAPSHOT_MARKER: &str = "cached snapshot";

/// Request body sent to the reader
#[derive(Debug, Serialize)]
pub struct ReaderRequest<'a> {
    pub url: &'a str,
}

/// Top-level reader response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderResponse {
    #[serde(default)]
    pub data: Option<ReaderData>,

    #[serde(default)]
    pub warning: Option<String>,
}

/// Extracted page content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderData {
    #[serde(default)]
    pub title: Option<String>,

    /// Page body as markdown
    #[serde(default)]
    pub content: Option<String>,

    /// URL the reader actually fetched
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub metadata: Option<ReaderMetadata>,
}

/// Page metadata (global endpoint only)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderMetadata {
    #[serde(default)]
    pub lang: Option<String>,
}

impl ReaderResponse {
    /// Returns true if the reader flagged this response as a cached render
    pub fn is_cached_snapshot(&self) -> bool {
        self.warning
            .as_deref()
            .map(|w| w.to_lowercase().contains(CACHED_SNAPSHOT_MARKER))
            .unwrap_or(false)
    }
}

/// The normalized result of one successful fetch
///
/// Only built from a non-stale, parseable reader response. Fields are
/// read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    source_url: String,
    resolved_url: String,
    title: String,
    description: String,
    language: String,
    markdown_body: String,
    fetched_at: i64,
}

impl PageRecord {
    /// Creates a record without metadata
    pub fn new(
        source_url: impl Into<String>,
        resolved_url: impl Into<String>,
        title: impl Into<String>,
        markdown_body: impl Into<String>,
        fetched_at: i64,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            resolved_url: resolved_url.into(),
            title: title.into(),
            description: String::new(),
            language: String::new(),
            markdown_body: markdown_body.into(),
            fetched_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Normalizes a reader response into a record
    ///
    /// # Arguments
    ///
    /// * `source_url` - The URL that was requested
    /// * `response` - A clean (non-stale) reader response
    /// * `with_metadata` - Whether the endpoint exposes description and language
    /// * `fetched_at` - Epoch seconds of the successful fetch
    pub fn from_response(
        source_url: &str,
        response: ReaderResponse,
        with_metadata: bool,
        fetched_at: i64,
    ) -> Self {
        let data = response.data.unwrap_or_default();

        let resolved_url = data
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| source_url.to_string());

        let record = Self::new(
            source_url,
            resolved_url,
            data.title.unwrap_or_default(),
            data.content.unwrap_or_default(),
            fetched_at,
        );

        if !with_metadata {
            return record;
        }

        let language = data
            .metadata
            .and_then(|m| m.lang)
            .unwrap_or_default();

        record
            .with_description(data.description.unwrap_or_default())
            .with_language(language)
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn resolved_url(&self) -> &str {
        &self.resolved_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn markdown_body(&self) -> &str {
        &self.markdown_body
    }

    pub fn fetched_at(&self) -> i64 {
        self.fetched_at
    }
}
