//! Crawler module for reader-backed page capture
//!
//! This module contains the core crawling logic, including:
//! - Reader API requests with retry and cache-busting
//! - Normalizing reader responses into page records
//! - Randomized delay between requests
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod response;
mod scheduler;

pub use coordinator::{reanalyze, run_crawl, Coordinator, CrawlReport};
pub use fetcher::{FetchFailure, FetchOutcome, ReaderClient, CACHE_RETRY_DELAY, RETRY_BACKOFF};
pub use response::{PageRecord, ReaderData, ReaderMetadata, ReaderResponse};
pub use scheduler::DelayPolicy;
