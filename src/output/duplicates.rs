//! Duplicate title classification
//!
//! Groups the top-level markdown files of an output directory by their
//! frontmatter title and moves every member of a multi-file group into a
//! folder named after the title. Files already inside folders are not
//! scanned, so a second pass over the same directory moves nothing.

use crate::output::frontmatter::parse_document;
use crate::output::{OutputError, OutputResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Longest folder name derived from a title, in characters
const MAX_FOLDER_CHARS: usize = 50;

const UNTITLED_FOLDER: &str = "untitled";

#[allow(clippy::expect_used)]
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("non-word regex is valid"));

#[allow(clippy::expect_used)]
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator regex is valid"));

/// One set of files sharing a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Number of files sharing the title
    pub total: usize,

    /// Number of files moved into the folder
    pub moved: usize,

    /// Folder name under the output directory
    pub folder: String,
}

/// Result of one classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Multi-file groups keyed by title
    pub groups: BTreeMap<String, DuplicateGroup>,

    /// Files whose title no other file shares
    pub unique: usize,
}

impl DuplicateReport {
    /// Total number of files belonging to a duplicate group
    pub fn duplicate_files(&self) -> usize {
        self.groups.values().map(|g| g.total).sum()
    }

    /// Total number of files moved in this pass
    pub fn moved_files(&self) -> usize {
        self.groups.values().map(|g| g.moved).sum()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Derives a folder name from a title
///
/// Lowercases, strips everything except word characters, whitespace and
/// hyphens, collapses whitespace/hyphen runs into one hyphen, trims
/// hyphens from both ends and keeps the first 50 characters.
///
/// # Examples
///
/// ```
/// use sitemap_reader::output::folder_name_for_title;
///
/// assert_eq!(folder_name_for_title("Getting Started: Part 1!"), "getting-started-part-1");
/// assert_eq!(folder_name_for_title("???"), "untitled");
/// ```
pub fn folder_name_for_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let collapsed = SEPARATOR_RUN.replace_all(&stripped, "-");
    let truncated: String = collapsed.chars().take(MAX_FOLDER_CHARS).collect();
    let slug = truncated.trim_matches('-');

    if slug.is_empty() {
        UNTITLED_FOLDER.to_string()
    } else {
        slug.to_string()
    }
}

/// Classifies the top-level markdown files of `dir` and moves duplicates
///
/// # Arguments
///
/// * `dir` - The crawl output directory
///
/// # Returns
///
/// * `Ok(DuplicateReport)` - Groups found and files moved
/// * `Err(OutputError::MissingOutputDir)` - `dir` does not exist
/// * `Err(OutputError::Io)` - A file could not be read or moved
pub fn classify_duplicates(dir: &Path) -> OutputResult<DuplicateReport> {
    if !dir.is_dir() {
        return Err(OutputError::MissingOutputDir(dir.to_path_buf()));
    }

    let mut by_title: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in markdown_files(dir)? {
        let title = read_title(&path)?;
        by_title.entry(title).or_default().push(path);
    }

    let mut report = DuplicateReport::default();

    for (title, files) in by_title {
        if files.len() < 2 {
            report.unique += files.len();
            continue;
        }

        let folder = folder_name_for_title(&title);
        let target_dir = dir.join(&folder);
        fs::create_dir_all(&target_dir)?;

        let mut moved = 0;
        for file in &files {
            let Some(name) = file.file_name() else {
                continue;
            };
            fs::rename(file, target_dir.join(name))?;
            moved += 1;
        }

        tracing::info!(
            title = %title,
            folder = %folder,
            files = files.len(),
            "Moved duplicate group"
        );

        report.groups.insert(
            title,
            DuplicateGroup {
                total: files.len(),
                moved,
                folder,
            },
        );
    }

    tracing::info!(
        unique = report.unique,
        duplicates = report.duplicate_files(),
        groups = report.groups.len(),
        "Duplicate analysis complete"
    );

    Ok(report)
}

/// Top-level `*.md` files of `dir`, sorted by name
fn markdown_files(dir: &Path) -> OutputResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_markdown = path.extension().map(|ext| ext == "md").unwrap_or(false);
        if is_markdown && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Frontmatter title as written, or the file stem when the key is missing
///
/// A blank title is a key of its own, so untitled pages group together.
fn read_title(path: &Path) -> OutputResult<String> {
    let text = fs::read_to_string(path)?;
    let doc = parse_document(&text);

    let title = match doc.get("title") {
        Some(title) => title.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    Ok(title)
}
