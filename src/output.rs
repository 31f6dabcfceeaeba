//! Run reports returned by the library entry points.

use crate::book::Book;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a `build` run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteOutput {
    /// Final books, in source order, as written to the artifacts.
    pub books: Vec<Book>,
    /// Path of the rendered HTML page.
    pub html_path: PathBuf,
    /// Path of the JSON dump.
    pub json_path: PathBuf,
    pub stats: RunStats,
}

/// Counters for one `build` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Entries read from the source file.
    pub source_books: usize,
    /// Entries sent to the catalog (after `limit`).
    pub looked_up: usize,
    /// Entries the catalog resolved.
    pub enriched: usize,
    /// Entries dropped because the catalog had no match.
    pub not_found: usize,
    /// Covers fetched over the network in this run.
    pub covers_downloaded: usize,
    /// Covers already present in the images directory.
    pub covers_cached: usize,
    /// Covers whose download failed (left absent).
    pub covers_failed: usize,
    pub total_duration_ms: u64,
}

/// Counters for one `fix-covers` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixStats {
    /// Books in the artifact.
    pub books: usize,
    /// Books whose image URL carries the placeholder marker.
    pub candidates: usize,
    /// Placeholder covers replaced with a resized real cover.
    pub fixed: usize,
    /// Catalog pages without the cover element.
    pub missing_cover: usize,
    /// Candidates skipped because a request or the resize failed.
    pub failed: usize,
    pub total_duration_ms: u64,
}
