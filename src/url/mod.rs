//! URL handling module for Sitemap-Reader
//!
//! This module provides domain extraction and the URL-to-filename mapping
//! used by the content writer.

mod domain;
mod filename;

// Re-export main functions
pub use domain::extract_domain;
pub use filename::{derive_file_name, derive_file_stem};
