//! Catalog lookup: free-text query in, [`CatalogRecord`] out.
//!
//! The pipeline only sees the [`CatalogLookup`] trait, so tests and other
//! catalogs can plug in without touching the stages. [`OpenLibraryCatalog`]
//! is the shipped implementation, backed by the Open Library search API.

use crate::book::CatalogRecord;
use crate::config::SiteConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// A book catalog that resolves a search string to one record.
///
/// Implementations return [`LookupError::NotFound`] when the catalog has no
/// match; every other failure is [`LookupError::Transport`].
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<CatalogRecord, LookupError>;
}

/// Open Library search client.
///
/// Queries `{base_url}/search.json?q=...&limit=1` and maps the top hit.
pub struct OpenLibraryCatalog {
    client: reqwest::Client,
    base_url: String,
    covers_base_url: String,
    placeholder_image_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    /// Work key, e.g. `/works/OL893415W`.
    key: String,
    cover_i: Option<i64>,
    #[serde(default)]
    first_publish_year: i32,
    #[serde(default)]
    number_of_pages_median: u32,
    #[serde(default)]
    ratings_average: f64,
    #[serde(default)]
    ratings_count: u64,
}

const SEARCH_FIELDS: &str =
    "key,cover_i,first_publish_year,number_of_pages_median,ratings_average,ratings_count";

impl OpenLibraryCatalog {
    pub fn new(client: reqwest::Client, config: &SiteConfig) -> Self {
        Self {
            client,
            base_url: config.catalog_base_url.clone(),
            covers_base_url: config.covers_base_url.clone(),
            placeholder_image_url: config.placeholder_image_url.clone(),
        }
    }

    fn to_record(&self, doc: SearchDoc) -> CatalogRecord {
        let catalog_id = doc
            .key
            .rsplit('/')
            .next()
            .unwrap_or(doc.key.as_str())
            .to_string();
        let image_url = match doc.cover_i {
            Some(id) if id > 0 => format!("{}/b/id/{}-M.jpg", self.covers_base_url, id),
            _ => self.placeholder_image_url.clone(),
        };

        CatalogRecord {
            image_url,
            publication_year: doc.first_publish_year,
            num_pages: doc.number_of_pages_median,
            average_rating: doc.ratings_average,
            ratings_count: doc.ratings_count,
            catalog_url: format!("{}{}", self.base_url, doc.key),
            catalog_id,
        }
    }
}

#[async_trait]
impl CatalogLookup for OpenLibraryCatalog {
    async fn lookup(&self, query: &str) -> Result<CatalogRecord, LookupError> {
        let transport = |detail: String| LookupError::Transport {
            query: query.to_string(),
            detail,
        };

        let url = format!("{}/search.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", "1"), ("fields", SEARCH_FIELDS)])
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {status}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| transport(format!("invalid search response: {e}")))?;

        let doc = body
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound {
                query: query.to_string(),
            })?;

        let record = self.to_record(doc);
        debug!(query, catalog_id = %record.catalog_id, "Catalog match");
        Ok(record)
    }
}
