//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the sequential crawl loop:
//! - Resolving the target into a URL list
//! - Fetching and writing each page in order
//! - Enforcing the wall-clock budget and inter-request delay
//! - Running the duplicate pass and writing reports at the end

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, ReaderClient};
use crate::crawler::scheduler::DelayPolicy;
use crate::output::{
    classify_duplicates, report_timestamp, ContentWriter, CrawlSummary, DuplicateReport,
    ProgressSnapshot, ReportGenerator,
};
use crate::sitemap::{build_sitemap_client, resolve_targets};
use crate::state::CrawlRun;
use crate::CrawlerError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub summary: CrawlSummary,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub output_dir: PathBuf,
    pub summary_path: PathBuf,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    config_hash: String,
    sitemap_client: Client,
    reader: ReaderClient,
    writer: ContentWriter,
    reports: ReportGenerator,
    delay: DelayPolicy,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the config file, written into the summary
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlerError)` - An HTTP client could not be built
    pub fn new(config: Config, config_hash: impl Into<String>) -> Result<Self, CrawlerError> {
        let sitemap_client = build_sitemap_client()?;
        let reader = ReaderClient::new(&config.reader)?;
        let output_dir = config.output.crawl_dir();

        Ok(Self {
            config_hash: config_hash.into(),
            sitemap_client,
            reader,
            writer: ContentWriter::new(output_dir.clone()),
            reports: ReportGenerator::new(output_dir),
            delay: DelayPolicy::from_config(&config.crawl),
            config,
        })
    }

    /// Replaces the reader client (e.g. one with shorter backoff waits)
    pub fn with_reader(mut self, reader: ReaderClient) -> Self {
        self.reader = reader;
        self
    }

    /// Replaces the inter-request delay policy
    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Resolves the configured target into the full URL list
    pub async fn resolve(&self) -> Result<Vec<String>, CrawlerError> {
        Ok(resolve_targets(&self.sitemap_client, &self.config.crawl.target).await?)
    }

    /// Resolves the target and returns the URLs a crawl would process
    ///
    /// Applies the start index, so an out-of-range index fails here exactly
    /// as it would for a real crawl.
    pub async fn plan(&self) -> Result<Vec<String>, CrawlerError> {
        let urls = self.resolve().await?;
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        let run = CrawlRun::new(urls, self.config.crawl.start_index, None)?;
        Ok(run.pending().to_vec())
    }

    /// Runs a complete crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CrawlReport))` - The crawl ran (possibly cut short by the budget)
    /// * `Ok(None)` - The target resolved to no URLs; nothing was written
    /// * `Err(CrawlerError)` - Sitemap failure or invalid start index; no page was fetched
    pub async fn run(&self) -> Result<Option<CrawlReport>, CrawlerError> {
        self.log_settings();

        let urls = self.resolve().await?;
        if urls.is_empty() {
            tracing::warn!(source = %self.config.crawl.target, "No URLs found, nothing to crawl");
            return Ok(None);
        }

        self.run_urls(urls).await.map(Some)
    }

    /// Crawls an already-resolved URL list
    pub async fn run_urls(&self, urls: Vec<String>) -> Result<CrawlReport, CrawlerError> {
        let budget = Duration::from_secs(self.config.crawl.crawler_timeout);
        let mut run = CrawlRun::new(urls, self.config.crawl.start_index, Some(budget))?;

        if run.start_index() > 1 {
            tracing::info!(
                start_index = run.start_index(),
                skipped = run.start_index() - 1,
                "Starting from offset"
            );
        }

        let live = self.config.crawl.live_report;
        if live {
            if let Err(e) = self.reports.begin_live(&report_timestamp()) {
                tracing::warn!(error = %e, "Could not start live failure log");
            }
        }

        run.start()?;
        tracing::info!(
            urls = run.pending().len(),
            total = run.total_urls(),
            "Crawl started"
        );

        let pending = run.pending().to_vec();
        let last = pending.len().saturating_sub(1);
        let mut timed_out = false;

        for (offset, url) in pending.iter().enumerate() {
            if run.budget_exhausted() {
                tracing::warn!(
                    elapsed_secs = run.elapsed().as_secs(),
                    limit_secs = self.config.crawl.crawler_timeout,
                    processed = run.processed(),
                    "Crawler timeout reached, stopping"
                );
                timed_out = true;
                break;
            }

            let position = run.global_position(offset);
            let total = run.total_urls();
            tracing::info!(url = %url, position, total, "[{}/{}] Processing", position, total);

            self.process_url(&mut run, url).await;

            if live {
                let progress = ProgressSnapshot::from_run(&run);
                if let Err(e) = self.reports.write_progress(&progress, &report_timestamp()) {
                    tracing::warn!(error = %e, "Could not update live summary");
                }
            }

            if offset < last {
                self.delay.pause().await;
            }
        }

        run.finish(timed_out)?;
        tracing::info!(
            state = %run.state(),
            processed = run.processed(),
            succeeded = run.succeeded().len(),
            failed = run.failed().len(),
            abandoned = run.abandoned(),
            elapsed_secs = run.elapsed().as_secs_f64(),
            "Crawl finished"
        );

        let duplicates = self.analyze_duplicates();
        let summary = CrawlSummary::from_run(&run, &self.config_hash, duplicates);
        let summary_path = self
            .reports
            .write_final(&summary, run.failed(), &report_timestamp())?;

        Ok(CrawlReport {
            summary,
            succeeded: run.succeeded().to_vec(),
            failed: run.failed().to_vec(),
            output_dir: self.writer.dir().to_path_buf(),
            summary_path,
        })
    }

    /// Fetches and writes one URL, recording the outcome on the run
    async fn process_url(&self, run: &mut CrawlRun, url: &str) {
        match self.reader.fetch(url).await {
            FetchOutcome::Success(record) => match self.writer.write(&record) {
                Ok(_) => {
                    tracing::info!(url = %url, outcome = "success", "Page saved");
                    run.record_success(url);
                }
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "Failed to save page");
                    self.record_failure(run, url);
                }
            },
            FetchOutcome::Failure(failure) => {
                tracing::warn!(url = %url, outcome = %failure, "Failed to fetch page");
                self.record_failure(run, url);
            }
        }
    }

    fn record_failure(&self, run: &mut CrawlRun, url: &str) {
        run.record_failure(url);
        if self.config.crawl.live_report {
            if let Err(e) = self.reports.append_failure(url) {
                tracing::warn!(url = %url, error = %e, "Could not append to failure log");
            }
        }
    }

    /// Runs the duplicate pass if anything was written
    fn analyze_duplicates(&self) -> Option<DuplicateReport> {
        let dir = self.writer.dir();
        if !dir.is_dir() {
            return None;
        }
        match classify_duplicates(dir) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Duplicate analysis failed");
                None
            }
        }
    }

    fn log_settings(&self) {
        let reader = &self.config.reader;
        tracing::info!(
            source = %self.config.crawl.target,
            output = %self.writer.dir().display(),
            endpoint = %self.reader.endpoint(),
            api_key = reader.effective_api_key().is_some(),
            eu_compliance = reader.eu_compliance,
            no_cache = reader.no_cache,
            css_selector = reader.css_selector.as_deref().unwrap_or("-"),
            wait_for_selector = reader.wait_for_selector.as_deref().unwrap_or("-"),
            "Starting sitemap crawl"
        );
    }
}

/// Runs the duplicate pass over an existing output directory without fetching
pub fn reanalyze(config: &Config) -> Result<DuplicateReport, CrawlerError> {
    let dir = config.output.crawl_dir();
    tracing::info!(dir = %dir.display(), "Re-analyzing existing output");
    Ok(classify_duplicates(&dir)?)
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file
///
/// # Example
///
/// ```no_run
/// use sitemap_reader::config::load_config_with_hash;
/// use sitemap_reader::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// if let Some(report) = run_crawl(config, hash).await? {
///     println!("{} pages saved", report.succeeded.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: impl Into<String>,
) -> Result<Option<CrawlReport>, CrawlerError> {
    let coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run().await
}
