//! Knowledge-base importer
//!
//! Imports a crawl output directory into a Dify-compatible knowledge base,
//! creating the dataset first when none is configured.

use anyhow::{bail, Context};
use clap::Parser;
use sitemap_reader::config::load_config;
use sitemap_reader::knowledge_base::{Importer, KnowledgeBaseClient};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Import crawled markdown files into a knowledge base
#[derive(Parser, Debug)]
#[command(name = "kb-import")]
#[command(version)]
#[command(about = "Import crawled markdown files into a knowledge base", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Directory to import (defaults to the configured output directory)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("sitemap_reader=info,kb_import=info,warn"),
        1 => EnvFilter::new("sitemap_reader=debug,kb_import=debug,info"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let Some(kb) = config.knowledge_base.as_ref() else {
        bail!("no [knowledge-base] section in {}", cli.config.display());
    };
    let Some(api_key) = kb.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("knowledge-base api-key is not set (config or DIFY_API_KEY)");
    };

    let mut client = KnowledgeBaseClient::new(&kb.base_url, api_key)?;

    let dataset_id = match kb.dataset_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(id) => id.to_string(),
        None => {
            tracing::info!("No dataset id configured, creating a new knowledge base");
            let id = client
                .create_dataset(kb)
                .await
                .context("failed to create knowledge base")?;
            client
                .update_retrieval_model(&id, kb)
                .await
                .context("failed to configure retrieval model")?;
            tracing::info!(
                "Add `dataset-id = \"{}\"` under [knowledge-base] to reuse this knowledge base",
                id
            );
            id
        }
    };
    client.set_dataset(dataset_id.clone());

    let dir = cli.dir.unwrap_or_else(|| config.output.crawl_dir());
    tracing::info!(dataset = %dataset_id, dir = %dir.display(), "Starting import");

    let fields = client
        .ensure_metadata_fields(config.reader.eu_compliance)
        .await
        .context("failed to set up metadata fields")?;

    let summary = Importer::new(&client, fields)
        .import_directory(&dir)
        .await
        .with_context(|| format!("failed to import {}", dir.display()))?;

    println!("\nImport Summary:");
    println!("  Imported: {}", summary.imported.len());
    println!("  Skipped:  {}", summary.skipped.len());
    println!("  Failed:   {}", summary.failed.len());
    for (path, error) in &summary.failed {
        println!("    - {}: {}", path.display(), error);
    }

    Ok(())
}
