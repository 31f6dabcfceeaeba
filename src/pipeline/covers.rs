//! Cover stage: name each cover after its catalog id and download it.
//!
//! No book is dropped here. A failed download leaves the cover absent and
//! the book still points at the file name it would have had, so the next
//! run (or `fix-covers`) can fill it in.

use crate::book::{Book, EnrichedBook};
use crate::error::BookshelfError;
use crate::pipeline::fetch::{FetchOutcome, ImageFetcher};
use crate::pipeline::throttle::Throttle;
use crate::progress::{ProgressCallback, Stage};
use tracing::{info, warn};

/// Extension used when the image URL has none.
const FALLBACK_EXTENSION: &str = "jpg";

/// Outcome counters for the cover stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverStats {
    pub downloaded: usize,
    pub cached: usize,
    pub failed: usize,
}

/// Local cover file name: `{catalog_id}.{extension}`.
///
/// The extension is everything after the last `.` in `image_url`. A URL
/// whose last `.` sits before the final `/` has no extension of its own
/// and falls back to `jpg`.
pub fn image_name_for(catalog_id: &str, image_url: &str) -> String {
    let extension = match image_url.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
        _ => {
            warn!(image_url, "Image URL has no extension, using .{}", FALLBACK_EXTENSION);
            FALLBACK_EXTENSION
        }
    };
    format!("{catalog_id}.{extension}")
}

/// Download every cover in order, pausing after each book.
pub async fn attach_covers(
    books: Vec<EnrichedBook>,
    fetcher: &ImageFetcher,
    throttle: &Throttle,
    progress: Option<&ProgressCallback>,
) -> Result<(Vec<Book>, CoverStats), BookshelfError> {
    let total = books.len();
    let mut stats = CoverStats::default();
    let mut out = Vec::with_capacity(total);

    if let Some(cb) = progress {
        cb.on_stage_start(Stage::Covers, total);
    }

    for (idx, book) in books.into_iter().enumerate() {
        let image_name = image_name_for(&book.record.catalog_id, &book.record.image_url);

        match fetcher.fetch(&book.record.image_url, &image_name).await? {
            FetchOutcome::Downloaded { .. } => {
                stats.downloaded += 1;
                if let Some(cb) = progress {
                    cb.on_book_complete(Stage::Covers, idx, total, &book.entry.name);
                }
            }
            FetchOutcome::Cached => {
                stats.cached += 1;
                if let Some(cb) = progress {
                    cb.on_book_complete(Stage::Covers, idx, total, &book.entry.name);
                }
            }
            FetchOutcome::Failed(err) => {
                stats.failed += 1;
                if let Some(cb) = progress {
                    cb.on_book_skipped(Stage::Covers, idx, total, &book.entry.name, &err.to_string());
                }
            }
        }

        out.push(Book { book, image_name });
        throttle.pause().await;
    }

    if let Some(cb) = progress {
        cb.on_stage_complete(Stage::Covers, total, stats.downloaded + stats.cached);
    }
    info!(
        "Covers: {} downloaded, {} cached, {} failed",
        stats.downloaded, stats.cached, stats.failed
    );

    Ok((out, stats))
}
