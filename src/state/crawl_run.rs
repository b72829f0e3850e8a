use crate::state::RunState;
use crate::CrawlerError;
use std::time::{Duration, Instant};

/// Accumulator for a single crawl invocation
///
/// Holds the resolved URL list, the start offset, and the append-only
/// success and failure lists. Only the coordinator mutates it; the report
/// generator reads it once the run is over (or after each step in
/// live-report mode).
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// Every URL the resolver produced, in document order
    urls: Vec<String>,

    /// 1-based position of the first URL to process
    start_index: usize,

    /// URLs whose fetch and write succeeded, in processing order
    succeeded: Vec<String>,

    /// URLs whose fetch or write failed, in processing order
    failed: Vec<String>,

    /// Current lifecycle state
    state: RunState,

    /// Monotonic start time, set on `start()`
    started_at: Option<Instant>,

    /// Monotonic finish time, set on `finish()`
    finished_at: Option<Instant>,

    /// Wall-clock budget; `None` means unlimited
    budget: Option<Duration>,
}

impl CrawlRun {
    /// Creates a run over `urls` starting at the 1-based `start_index`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRun)` - The index lies within `1..=urls.len()`
    /// * `Err(CrawlerError::InvalidStartIndex)` - Index is 0 or past the end
    pub fn new(
        urls: Vec<String>,
        start_index: usize,
        budget: Option<Duration>,
    ) -> Result<Self, CrawlerError> {
        if start_index < 1 || start_index > urls.len() {
            return Err(CrawlerError::InvalidStartIndex {
                index: start_index,
                total: urls.len(),
            });
        }

        Ok(Self {
            urls,
            start_index,
            succeeded: Vec::new(),
            failed: Vec::new(),
            state: RunState::NotStarted,
            started_at: None,
            finished_at: None,
            budget: budget.filter(|b| !b.is_zero()),
        })
    }

    /// Moves the run into `Running` and starts the clock
    pub fn start(&mut self) -> Result<(), CrawlerError> {
        self.transition(RunState::Running)?;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Ends the run as `Completed` or `TimedOut`
    pub fn finish(&mut self, timed_out: bool) -> Result<(), CrawlerError> {
        let next = if timed_out {
            RunState::TimedOut
        } else {
            RunState::Completed
        };
        self.transition(next)?;
        self.finished_at = Some(Instant::now());
        Ok(())
    }

    fn transition(&mut self, next: RunState) -> Result<(), CrawlerError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Records a URL whose page was fetched and written
    pub fn record_success(&mut self, url: &str) {
        self.succeeded.push(url.to_string());
    }

    /// Records a URL whose fetch or write failed
    pub fn record_failure(&mut self, url: &str) {
        self.failed.push(url.to_string());
    }

    /// Returns true once the wall-clock budget has been used up
    ///
    /// Sampled by the coordinator before each URL; a fetch in flight is
    /// never interrupted.
    pub fn budget_exhausted(&self) -> bool {
        match (self.budget, self.started_at) {
            (Some(budget), Some(start)) => start.elapsed() > budget,
            _ => false,
        }
    }

    /// URLs this run is responsible for (the list minus the skipped prefix)
    pub fn pending(&self) -> &[String] {
        &self.urls[self.start_index - 1..]
    }

    /// Global 1-based position of the `offset`-th pending URL
    pub fn global_position(&self, offset: usize) -> usize {
        self.start_index + offset
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn total_urls(&self) -> usize {
        self.urls.len()
    }

    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Number of URLs fetched so far, successful or not
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Pending URLs left unprocessed (non-zero only after a timeout)
    pub fn abandoned(&self) -> usize {
        self.pending().len().saturating_sub(self.processed())
    }

    /// Success rate over processed URLs as a percentage
    pub fn success_rate(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            return 0.0;
        }
        (self.succeeded.len() as f64 / processed as f64) * 100.0
    }

    /// Time since `start()`, frozen at `finish()`
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}
