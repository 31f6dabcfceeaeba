//! Error types for the bookshelf library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`BookshelfError`]: **fatal**, the run cannot proceed (malformed source
//!   line, catalog transport failure, template error, unwritable output).
//!   Returned as `Err(BookshelfError)` from [`crate::build_site`] and
//!   [`crate::fix_covers`].
//!
//! * [`LookupError`]: the catalog boundary. `NotFound` is an expected
//!   per-book outcome (the book is dropped); `Transport` is promoted to
//!   [`BookshelfError::LookupFailed`] by the enrichment stage.
//!
//! * [`CoverError`]: **non-fatal**, one cover could not be downloaded or
//!   fixed. Logged, counted in the run stats, and the run carries on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the bookshelf library.
#[derive(Debug, Error)]
pub enum BookshelfError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// The book list file was not found.
    #[error("Source file not found: '{path}'\nCreate it with one `name | author | votes | suggested_by` line per book.")]
    SourceNotFound { path: PathBuf },

    /// The book list file exists but could not be read.
    #[error("Failed to read source file '{path}': {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source line does not have the expected shape.
    #[error("Malformed line {line} in '{path}': {reason}")]
    MalformedInput {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // ── Catalog errors ────────────────────────────────────────────────────
    /// The catalog lookup failed for a reason other than "not found".
    #[error("Catalog lookup failed for '{query}': {reason}")]
    LookupFailed { query: String, reason: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The HTML template could not be loaded or rendered.
    #[error("Template rendering failed: {0}")]
    TemplateRender(String),

    /// The book list could not be serialised to JSON.
    #[error("Failed to serialise books to JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Artifact errors (fix-covers) ──────────────────────────────────────
    /// The JSON artifact from a previous build is missing.
    #[error("Book artifact not found: '{path}'\nRun `bookshelf build` first.")]
    ArtifactNotFound { path: PathBuf },

    /// The JSON artifact could not be read or parsed.
    #[error("Failed to load book artifact '{path}': {detail}")]
    ArtifactParse { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write into the images directory.
    #[error("Failed to write image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of a failed catalog lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The catalog has no match for the query.
    #[error("no catalog match for '{query}'")]
    NotFound { query: String },

    /// Network or service failure.
    #[error("catalog request for '{query}' failed: {detail}")]
    Transport { query: String, detail: String },
}

/// A non-fatal error for a single cover.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum CoverError {
    /// The server answered with a non-success status.
    #[error("{url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The request could not be completed.
    #[error("{url}: {detail}")]
    Transport { url: String, detail: String },

    /// The downloaded file could not be decoded or re-encoded.
    #[error("{path}: image processing failed: {detail}")]
    Image { path: String, detail: String },
}
