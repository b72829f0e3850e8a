//! Summary value types
//!
//! Snapshots of a crawl taken for reporting. They are plain data and carry
//! no references back into the run.

use crate::output::DuplicateReport;
use crate::state::{CrawlRun, RunState};

/// Final summary of one crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub status: RunState,
    pub config_hash: String,
    pub start_index: usize,
    pub elapsed_seconds: f64,

    // Counts
    pub total_urls: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub abandoned: usize,

    /// Present when the duplicate pass ran
    pub duplicates: Option<DuplicateReport>,
}

impl CrawlSummary {
    /// Snapshots a finished (or in-progress) run
    pub fn from_run(run: &CrawlRun, config_hash: &str, duplicates: Option<DuplicateReport>) -> Self {
        Self {
            status: run.state(),
            config_hash: config_hash.to_string(),
            start_index: run.start_index(),
            elapsed_seconds: run.elapsed().as_secs_f64(),
            total_urls: run.total_urls(),
            processed: run.processed(),
            succeeded: run.succeeded().len(),
            failed: run.failed().len(),
            abandoned: run.abandoned(),
            duplicates,
        }
    }

    /// Percentage of processed URLs that succeeded; 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        rate(self.succeeded, self.processed)
    }
}

/// Interim counts written after each URL in live-report mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub remaining: usize,
}

impl ProgressSnapshot {
    pub fn from_run(run: &CrawlRun) -> Self {
        Self {
            processed: run.processed(),
            succeeded: run.succeeded().len(),
            failed: run.failed().len(),
            remaining: run.pending().len().saturating_sub(run.processed()),
        }
    }

    pub fn success_rate(&self) -> f64 {
        rate(self.succeeded, self.processed)
    }
}

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
