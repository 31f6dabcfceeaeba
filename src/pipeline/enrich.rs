//! Enrichment: merge catalog metadata into each source entry.
//!
//! Books the catalog does not know are dropped; any other lookup failure
//! aborts the run, since a partial page would silently hide books.

use crate::book::{BookEntry, EnrichedBook};
use crate::catalog::CatalogLookup;
use crate::error::{BookshelfError, LookupError};
use crate::pipeline::throttle::Throttle;
use crate::progress::{ProgressCallback, Stage};
use tracing::{debug, info};

/// Outcome counters for the enrichment stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub looked_up: usize,
    pub enriched: usize,
    pub not_found: usize,
}

/// The free-text query sent to the catalog for `entry`.
pub fn search_query(entry: &BookEntry) -> String {
    format!("{} {}", entry.name, entry.author)
}

/// Look up every entry in order, pausing after each match.
pub async fn enrich_books(
    entries: Vec<BookEntry>,
    catalog: &dyn CatalogLookup,
    throttle: &Throttle,
    progress: Option<&ProgressCallback>,
) -> Result<(Vec<EnrichedBook>, EnrichStats), BookshelfError> {
    let total = entries.len();
    let mut stats = EnrichStats {
        looked_up: total,
        ..Default::default()
    };
    let mut enriched = Vec::with_capacity(total);

    if let Some(cb) = progress {
        cb.on_stage_start(Stage::Enrich, total);
    }

    for (idx, entry) in entries.into_iter().enumerate() {
        let query = search_query(&entry);
        match catalog.lookup(&query).await {
            Ok(record) => {
                debug!(query = %query, catalog_id = %record.catalog_id, "Enriched");
                if let Some(cb) = progress {
                    cb.on_book_complete(Stage::Enrich, idx, total, &entry.name);
                }
                enriched.push(EnrichedBook::new(entry, record));
                stats.enriched += 1;
                throttle.pause().await;
            }
            Err(LookupError::NotFound { .. }) => {
                info!(query = %query, "Not found in catalog, skipping");
                if let Some(cb) = progress {
                    cb.on_book_skipped(Stage::Enrich, idx, total, &entry.name, "not found");
                }
                stats.not_found += 1;
            }
            Err(LookupError::Transport { detail, .. }) => {
                return Err(BookshelfError::LookupFailed {
                    query,
                    reason: detail,
                });
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_stage_complete(Stage::Enrich, total, stats.enriched);
    }
    info!(
        "Catalog lookups: {} matched, {} not found",
        stats.enriched, stats.not_found
    );

    Ok((enriched, stats))
}
