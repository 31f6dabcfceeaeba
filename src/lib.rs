//! # bookshelf
//!
//! Turn a plain-text reading list into a static web page.
//!
//! Each line of the source file names a book, its author, a vote count and
//! who suggested it. bookshelf looks every book up in a catalog, downloads
//! its cover, and renders an HTML page plus a JSON dump of everything it
//! learned. A second pass, [`fix_covers`], replaces the catalog's stock
//! "no cover" images with the real cover scraped from the book's page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source.txt
//!  │
//!  ├─ 1. Source   parse `name | author | votes | suggested_by` lines
//!  ├─ 2. Enrich   catalog lookup per book, unknown books dropped
//!  ├─ 3. Covers   download `{catalog_id}.{ext}` unless already cached
//!  └─ 4. Render   dist/index.html + dist/output.json
//!
//! dist/output.json
//!  └─ fix-covers  scrape real cover, resize to 98 px wide, overwrite placeholder
//! ```
//!
//! Everything runs sequentially with a fixed pause between external calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookshelf::{build_site, OpenLibraryCatalog, SiteConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SiteConfig::builder()
//!         .source_path("source.txt")
//!         .output_dir("dist")
//!         .build()?;
//!     let client = config.http_client()?;
//!     let catalog = OpenLibraryCatalog::new(client.clone(), &config);
//!     let output = build_site(&config, &catalog, &client).await?;
//!     eprintln!("{} books → {}", output.books.len(), output.html_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bookshelf` binary and [`logging`] (clap, anyhow, indicatif, tracing-subscriber, tracing-appender) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod book;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fix;
#[cfg(feature = "cli")]
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod site;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use book::{Book, BookEntry, CatalogRecord, EnrichedBook};
pub use catalog::{CatalogLookup, OpenLibraryCatalog};
pub use config::{SiteConfig, SiteConfigBuilder};
pub use error::{BookshelfError, CoverError, LookupError};
pub use fix::fix_covers;
pub use output::{FixStats, RunStats, SiteOutput};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use site::build_site;
