//! Progress-callback trait for per-book pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::SiteConfigBuilder::progress_callback`] to receive events
//! as each stage walks the book list. The CLI uses it to drive a progress
//! bar; library callers can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use bookshelf::{PipelineProgressCallback, SiteConfig, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_book_complete(&self, stage: Stage, index: usize, total: usize, name: &str) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage}: {}/{} {}", index + 1, total, name);
//!     }
//! }
//!
//! let config = SiteConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A pipeline stage that reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Catalog lookups.
    Enrich,
    /// Cover downloads.
    Covers,
    /// Placeholder cover repair.
    FixCovers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Enrich => "Looking up",
            Stage::Covers => "Covers",
            Stage::FixCovers => "Fixing covers",
        };
        f.write_str(label)
    }
}

/// Called by the pipeline as it processes each book.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 0-based.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once before a stage touches its first book.
    fn on_stage_start(&self, stage: Stage, total: usize) {
        let _ = (stage, total);
    }

    /// Called when a book went through the stage.
    fn on_book_complete(&self, stage: Stage, index: usize, total: usize, name: &str) {
        let _ = (stage, index, total, name);
    }

    /// Called when a book was dropped or left untouched by the stage.
    fn on_book_skipped(&self, stage: Stage, index: usize, total: usize, name: &str, reason: &str) {
        let _ = (stage, index, total, name, reason);
    }

    /// Called once after the stage has seen every book.
    fn on_stage_complete(&self, stage: Stage, total: usize, success_count: usize) {
        let _ = (stage, total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SiteConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
