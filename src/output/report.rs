//! Report generation
//!
//! Writes `failed_urls.txt` and `crawl_summary.txt` into the crawl output
//! directory. In live-report mode failures are appended as they happen and
//! an interim summary is rewritten after every URL; the final report then
//! replaces both files.

use crate::output::summary::{CrawlSummary, ProgressSnapshot};
use crate::output::{DuplicateReport, OutputResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const FAILED_URLS_FILE: &str = "failed_urls.txt";
pub const SUMMARY_FILE: &str = "crawl_summary.txt";

/// Writes report files into one output directory
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn failed_urls_path(&self) -> PathBuf {
        self.dir.join(FAILED_URLS_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    /// Starts a fresh live failure log, replacing one from an earlier run
    pub fn begin_live(&self, generated: &str) -> OutputResult<()> {
        fs::create_dir_all(&self.dir)?;
        let header = format!("# Failed URLs Report\nGenerated: {}\n\n", generated);
        fs::write(self.failed_urls_path(), header)?;
        Ok(())
    }

    /// Appends one failed URL to the live failure log
    pub fn append_failure(&self, url: &str) -> OutputResult<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.failed_urls_path())?;
        writeln!(file, "{}", url)?;
        Ok(())
    }

    /// Rewrites the interim summary
    pub fn write_progress(&self, progress: &ProgressSnapshot, generated: &str) -> OutputResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.summary_path(), format_progress(progress, generated))?;
        Ok(())
    }

    /// Writes the final reports
    ///
    /// The failure list is written only when there are failures; a stale
    /// list from an earlier run or from live mode is removed otherwise.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the summary file
    /// * `Err(OutputError::Io)` - A report could not be written
    pub fn write_final(
        &self,
        summary: &CrawlSummary,
        failed: &[String],
        generated: &str,
    ) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        if failed.is_empty() {
            remove_if_present(&self.failed_urls_path())?;
        } else {
            fs::write(self.failed_urls_path(), format_failed_urls(failed, generated))?;
            tracing::info!(
                path = %self.failed_urls_path().display(),
                count = failed.len(),
                "Failed URLs report written"
            );
        }

        let path = self.summary_path();
        fs::write(&path, format_summary(summary, generated))?;
        tracing::info!(path = %path.display(), "Summary report written");

        Ok(path)
    }
}

fn remove_if_present(path: &Path) -> OutputResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Formats the failed URL list
pub fn format_failed_urls(failed: &[String], generated: &str) -> String {
    let mut out = String::new();
    out.push_str("# Failed URLs Report\n");
    out.push_str(&format!("Generated: {}\n", generated));
    out.push_str(&format!("Total failed: {}\n\n", failed.len()));
    for url in failed {
        out.push_str(url);
        out.push('\n');
    }
    out
}

/// Formats the final summary
pub fn format_summary(summary: &CrawlSummary, generated: &str) -> String {
    let mut out = String::new();

    out.push_str("# Crawl Summary Report\n");
    out.push_str(&format!("Generated: {}\n", generated));
    out.push_str(&format!("Status: {}\n", summary.status));
    out.push_str(&format!("Config hash: {}\n", summary.config_hash));
    out.push_str(&format!("Start index: {}\n", summary.start_index));
    out.push_str(&format!("Total URLs in list: {}\n", summary.total_urls));
    out.push_str(&format!("Total URLs processed: {}\n", summary.processed));
    out.push_str(&format!("Successful: {}\n", summary.succeeded));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    if summary.abandoned > 0 {
        out.push_str(&format!("Abandoned (timeout): {}\n", summary.abandoned));
    }
    out.push_str(&format!("Success rate: {:.1}%\n", summary.success_rate()));
    out.push_str(&format!("Elapsed: {:.1}s\n", summary.elapsed_seconds));

    if let Some(duplicates) = &summary.duplicates {
        out.push('\n');
        out.push_str(&format_duplicates(duplicates));
    }

    out
}

/// Formats a duplicate analysis breakdown
pub fn format_duplicates(report: &DuplicateReport) -> String {
    let mut out = String::from("## Duplicate Analysis\n");
    out.push_str(&format!("Unique pages: {}\n", report.unique));
    out.push_str(&format!("Duplicate files: {}\n", report.duplicate_files()));
    out.push_str(&format!("Duplicate groups: {}\n", report.groups.len()));

    for (title, group) in &report.groups {
        out.push_str(&format!(
            "- \"{}\" -> {}/ ({} files, {} moved)\n",
            title, group.folder, group.total, group.moved
        ));
    }
    out
}

/// Formats the interim live-mode summary
pub fn format_progress(progress: &ProgressSnapshot, generated: &str) -> String {
    let mut out = String::new();
    out.push_str("# Crawl Progress\n");
    out.push_str(&format!("Updated: {}\n", generated));
    out.push_str(&format!("Processed: {}\n", progress.processed));
    out.push_str(&format!("Successful: {}\n", progress.succeeded));
    out.push_str(&format!("Failed: {}\n", progress.failed));
    out.push_str(&format!("Remaining: {}\n", progress.remaining));
    out.push_str(&format!("Success rate: {:.1}%\n", progress.success_rate()));
    out
}

/// Local timestamp in the report format
pub fn report_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DuplicateGroup;
    use crate::state::RunState;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const STAMP: &str = "2024-05-01 12:00:00";

    fn summary() -> CrawlSummary {
        CrawlSummary {
            status: RunState::Completed,
            config_hash: "deadbeef".to_string(),
            start_index: 1,
            elapsed_seconds: 12.34,
            total_urls: 4,
            processed: 4,
            succeeded: 3,
            failed: 1,
            abandoned: 0,
            duplicates: None,
        }
    }

    #[test]
    fn test_format_failed_urls() {
        let text = format_failed_urls(
            &["https://a.com/x".to_string(), "https://a.com/y".to_string()],
            STAMP,
        );
        assert_eq!(
            text,
            "# Failed URLs Report\nGenerated: 2024-05-01 12:00:00\nTotal failed: 2\n\nhttps://a.com/x\nhttps://a.com/y\n"
        );
    }

    #[test]
    fn test_format_summary() {
        let text = format_summary(&summary(), STAMP);
        assert!(text.starts_with("# Crawl Summary Report\nGenerated: 2024-05-01 12:00:00\n"));
        assert!(text.contains("Status: completed\n"));
        assert!(text.contains("Config hash: deadbeef\n"));
        assert!(text.contains("Total URLs processed: 4\n"));
        assert!(text.contains("Successful: 3\n"));
        assert!(text.contains("Failed: 1\n"));
        assert!(text.contains("Success rate: 75.0%\n"));
        assert!(!text.contains("Abandoned"));
        assert!(!text.contains("Duplicate"));
    }

    #[test]
    fn test_format_summary_with_duplicates() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "Home".to_string(),
            DuplicateGroup {
                total: 2,
                moved: 2,
                folder: "home".to_string(),
            },
        );
        let mut s = summary();
        s.duplicates = Some(DuplicateReport { groups, unique: 1 });

        let text = format_summary(&s, STAMP);
        assert!(text.contains("Unique pages: 1\n"));
        assert!(text.contains("Duplicate files: 2\n"));
        assert!(text.contains("- \"Home\" -> home/ (2 files, 2 moved)\n"));
    }

    #[test]
    fn test_write_final_skips_empty_failure_list() {
        let tmp = TempDir::new().unwrap();
        let reports = ReportGenerator::new(tmp.path().join("out"));
        reports.begin_live(STAMP).unwrap();
        assert!(reports.failed_urls_path().exists());

        let mut s = summary();
        s.failed = 0;
        reports.write_final(&s, &[], STAMP).unwrap();

        assert!(!reports.failed_urls_path().exists());
        assert!(reports.summary_path().is_file());
    }

    #[test]
    fn test_live_failures_then_final_rewrite() {
        let tmp = TempDir::new().unwrap();
        let reports = ReportGenerator::new(tmp.path());

        reports.begin_live(STAMP).unwrap();
        reports.append_failure("https://a.com/1").unwrap();
        reports.append_failure("https://a.com/2").unwrap();
        let live = fs::read_to_string(reports.failed_urls_path()).unwrap();
        assert!(live.ends_with("\n\nhttps://a.com/1\nhttps://a.com/2\n"));

        let progress = ProgressSnapshot {
            processed: 2,
            succeeded: 0,
            failed: 2,
            remaining: 1,
        };
        reports.write_progress(&progress, STAMP).unwrap();
        let interim = fs::read_to_string(reports.summary_path()).unwrap();
        assert!(interim.starts_with("# Crawl Progress\n"));
        assert!(interim.contains("Remaining: 1\n"));

        let failed = vec!["https://a.com/1".to_string(), "https://a.com/2".to_string()];
        reports.write_final(&summary(), &failed, STAMP).unwrap();
        let final_list = fs::read_to_string(reports.failed_urls_path()).unwrap();
        assert!(final_list.contains("Total failed: 2\n"));
        let final_summary = fs::read_to_string(reports.summary_path()).unwrap();
        assert!(final_summary.starts_with("# Crawl Summary Report\n"));
    }
}
