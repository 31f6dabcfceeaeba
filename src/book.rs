//! Book records, one type per pipeline phase.
//!
//! A book starts as a [`BookEntry`] read from the source file, becomes an
//! [`EnrichedBook`] once the catalog answers, and a [`Book`] once its cover
//! has a local file name. Each phase only adds fields, and the later types
//! cannot be built without the data the earlier phases provide.
//!
//! All three serialise flat, so a [`Book`] in the JSON artifact is a single
//! object with the twelve keys `name`, `author`, `votes`, `suggested_by`,
//! `image_url`, `publication_year`, `num_pages`, `average_rating`,
//! `ratings_count`, `catalog_url`, `catalog_id` and `image_name`.

use serde::{Deserialize, Serialize};

/// A book as listed in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub name: String,
    pub author: String,
    pub votes: u32,
    pub suggested_by: String,
}

/// Metadata returned by a catalog lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub image_url: String,
    pub publication_year: i32,
    pub num_pages: u32,
    pub average_rating: f64,
    pub ratings_count: u64,
    pub catalog_url: String,
    pub catalog_id: String,
}

/// A book with its catalog metadata merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBook {
    #[serde(flatten)]
    pub entry: BookEntry,
    #[serde(flatten)]
    pub record: CatalogRecord,
}

impl EnrichedBook {
    pub fn new(entry: BookEntry, record: CatalogRecord) -> Self {
        Self { entry, record }
    }
}

/// A fully processed book: enriched and pointing at a local cover file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(flatten)]
    pub book: EnrichedBook,
    /// Cover file name inside the images directory.
    pub image_name: String,
}

impl Book {
    pub fn name(&self) -> &str {
        &self.book.entry.name
    }

    pub fn image_url(&self) -> &str {
        &self.book.record.image_url
    }

    pub fn catalog_url(&self) -> &str {
        &self.book.record.catalog_url
    }
}
