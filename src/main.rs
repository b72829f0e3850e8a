//! Sitemap-Reader main entry point
//!
//! This is the command-line interface for the sitemap crawler.

use anyhow::Context;
use clap::Parser;
use sitemap_reader::config::{load_config_with_hash, Config};
use sitemap_reader::crawler::{reanalyze, run_crawl, Coordinator};
use sitemap_reader::output::report::format_duplicates;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemap-Reader: sitemap-driven page capture through a reader API
///
/// Resolves a sitemap (or a single page URL), fetches every page as
/// markdown through the reader API, saves each one with frontmatter, and
/// groups pages sharing a title into folders.
#[derive(Parser, Debug)]
#[command(name = "sitemap-reader")]
#[command(version)]
#[command(about = "Crawl a sitemap into markdown files through a reader API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching pages
    #[arg(long, conflicts_with = "reanalyze")]
    dry_run: bool,

    /// Re-run duplicate analysis on the existing output directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    reanalyze: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(config, &config_hash).await
    } else if cli.reanalyze {
        handle_reanalyze(&config)
    } else {
        handle_crawl(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_reader=info,warn"),
            1 => EnvFilter::new("sitemap_reader=debug,info"),
            2 => EnvFilter::new("sitemap_reader=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and lists the URLs to crawl
async fn handle_dry_run(config: Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Sitemap-Reader Dry Run ===\n");

    println!("Reader:");
    println!("  Endpoint: {}", config.reader.endpoint());
    println!(
        "  API key: {}",
        if config.reader.effective_api_key().is_some() {
            "configured"
        } else {
            "not configured (free tier)"
        }
    );
    println!("  EU compliance: {}", config.reader.eu_compliance);
    println!("  No cache: {}", config.reader.no_cache);
    println!(
        "  CSS selector: {}",
        config.reader.css_selector.as_deref().unwrap_or("not set")
    );
    println!(
        "  Wait for selector: {}",
        config.reader.wait_for_selector.as_deref().unwrap_or("not set")
    );
    println!(
        "  Timeout: {}s, retries: {}",
        config.reader.request_timeout, config.reader.retry_count
    );

    println!("\nCrawl:");
    println!("  Target: {}", config.crawl.target);
    println!("  Start index: {}", config.crawl.start_index);
    println!(
        "  Delay: {:.1}-{:.1}s",
        config.crawl.min_delay, config.crawl.max_delay
    );
    match config.crawl.crawler_timeout {
        0 => println!("  Timeout: unlimited"),
        secs => println!("  Timeout: {}s", secs),
    }

    println!("\nOutput: {}", config.output.crawl_dir().display());

    let coordinator = Coordinator::new(config, config_hash)?;
    let urls = coordinator.plan().await.context("failed to resolve target")?;

    println!("\nURLs to crawl ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --reanalyze mode: duplicate analysis without fetching
fn handle_reanalyze(config: &Config) -> anyhow::Result<()> {
    let report = reanalyze(config).context("duplicate analysis failed")?;

    println!("=== Duplicate Analysis ===\n");
    print!("{}", format_duplicates(&report));
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    match run_crawl(config, config_hash).await {
        Ok(Some(report)) => {
            tracing::info!(
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                summary = %report.summary_path.display(),
                "Crawl completed"
            );
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
