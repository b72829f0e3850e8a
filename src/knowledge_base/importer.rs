//! Directory importer
//!
//! Imports every top-level markdown file of a crawl output directory as one
//! document. A document with the same name is replaced. Per-file failures
//! are collected in the summary instead of aborting the import.

use crate::knowledge_base::types::MetadataValue;
use crate::knowledge_base::{KnowledgeBaseClient, KnowledgeBaseResult};
use crate::output::{parse_document, Document};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pause between two file imports
pub const IMPORT_PAUSE: Duration = Duration::from_secs(1);

/// Outcome of a directory import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOutcome {
    Imported(String),
    Skipped,
}

/// Imports output files into one dataset
pub struct Importer<'a> {
    client: &'a KnowledgeBaseClient,
    fields: BTreeMap<String, String>,
    pause: Duration,
}

impl<'a> Importer<'a> {
    /// Creates an importer
    ///
    /// # Arguments
    ///
    /// * `client` - Client bound to the target dataset
    /// * `fields` - Metadata field ids by name, from `ensure_metadata_fields`
    pub fn new(client: &'a KnowledgeBaseClient, fields: BTreeMap<String, String>) -> Self {
        Self {
            client,
            fields,
            pause: IMPORT_PAUSE,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Imports every top-level `*.md` file of `dir` in name order
    ///
    /// # Returns
    ///
    /// * `Ok(ImportSummary)` - Per-file results
    /// * `Err(KnowledgeBaseError::Io)` - The directory could not be listed
    pub async fn import_directory(&self, dir: &Path) -> KnowledgeBaseResult<ImportSummary> {
        let files = markdown_files(dir)?;
        tracing::info!(dir = %dir.display(), files = files.len(), "Importing markdown files");

        let mut summary = ImportSummary::default();

        for (i, file) in files.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            match self.import_file(file).await {
                Ok(FileOutcome::Imported(id)) => {
                    tracing::info!(file = %file.display(), document = %id, "Imported document");
                    summary.imported.push(file.clone());
                }
                Ok(FileOutcome::Skipped) => {
                    tracing::warn!(file = %file.display(), "Empty content, skipping");
                    summary.skipped.push(file.clone());
                }
                Err(e) => {
                    tracing::error!(file = %file.display(), error = %e, "Import failed");
                    summary.failed.push((file.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            imported = summary.imported.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "Import complete"
        );
        Ok(summary)
    }

    async fn import_file(&self, path: &Path) -> KnowledgeBaseResult<FileOutcome> {
        let text = fs::read_to_string(path)?;
        let doc = parse_document(&text);

        if doc.body.trim().is_empty() {
            return Ok(FileOutcome::Skipped);
        }

        let name = document_name(&doc, path);

        if let Some(existing) = self.client.find_document_by_name(&name).await? {
            tracing::info!(name = %name, "Document already exists, replacing it");
            self.client.delete_document(&existing).await?;
        }

        let document_id = self.client.create_document_by_text(&name, &doc.body).await?;

        let values = self.metadata_values(&doc);
        if !values.is_empty() {
            let count = values.len();
            match self.client.update_document_metadata(&document_id, values).await {
                Ok(()) => tracing::debug!(document = %document_id, count, "Assigned metadata"),
                Err(e) => tracing::warn!(document = %document_id, error = %e, "Failed to assign metadata"),
            }
        }

        Ok(FileOutcome::Imported(document_id))
    }

    /// Frontmatter values whose keys have a field id
    fn metadata_values(&self, doc: &Document) -> Vec<MetadataValue> {
        doc.fields
            .iter()
            .filter_map(|(key, value)| {
                self.fields.get(key).map(|id| MetadataValue {
                    id: id.clone(),
                    value: value.clone(),
                    name: key.clone(),
                })
            })
            .collect()
    }
}

/// Title from the frontmatter, or the file stem
fn document_name(doc: &Document, path: &Path) -> String {
    match doc.title() {
        Some(title) => title.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn markdown_files(dir: &Path) -> KnowledgeBaseResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|ext| ext == "md").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
