//! `fix-covers` entry point: replace placeholder covers with real ones.
//!
//! Runs against the JSON artifact of an earlier `build`. For each book whose
//! image URL carries the placeholder marker it scrapes the catalog page for
//! the real cover, downloads it as `orig_{image_name}` and writes a resized
//! copy over `image_name`. The artifact itself is never modified.

use crate::book::Book;
use crate::config::SiteConfig;
use crate::error::{BookshelfError, CoverError};
use crate::output::FixStats;
use crate::pipeline::fetch::{FetchOutcome, ImageFetcher};
use crate::pipeline::scrape;
use crate::pipeline::throttle::Throttle;
use crate::progress::Stage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Prefix of the full-size download kept next to the resized cover.
pub const ORIGINAL_PREFIX: &str = "orig_";

/// What happened to one placeholder book.
#[derive(Debug)]
enum FixOutcome {
    Fixed,
    NoCoverElement,
    Failed(CoverError),
}

/// Load the books written by a previous `build`.
pub async fn load_books(path: &Path) -> Result<Vec<Book>, BookshelfError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BookshelfError::ArtifactNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BookshelfError::ArtifactParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|e| BookshelfError::ArtifactParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Repair every placeholder cover listed in the JSON artifact.
pub async fn fix_covers(
    config: &SiteConfig,
    client: &reqwest::Client,
) -> Result<FixStats, BookshelfError> {
    let total_start = Instant::now();
    let progress = config.progress_callback.as_ref();
    let throttle = Throttle::new(config.request_delay);

    let books = load_books(&config.json_path()).await?;
    let candidates: Vec<&Book> = books
        .iter()
        .filter(|b| b.image_url().contains(&config.placeholder_marker))
        .collect();

    let mut stats = FixStats {
        books: books.len(),
        candidates: candidates.len(),
        ..Default::default()
    };
    info!(
        "{} of {} books have a placeholder cover",
        stats.candidates, stats.books
    );

    let images_dir = config.images_dir();
    tokio::fs::create_dir_all(&images_dir)
        .await
        .map_err(|e| BookshelfError::ImageWriteFailed {
            path: images_dir.clone(),
            source: e,
        })?;
    let fetcher = ImageFetcher::new(client.clone(), images_dir);

    let total = candidates.len();
    if let Some(cb) = progress {
        cb.on_stage_start(Stage::FixCovers, total);
    }

    for (idx, book) in candidates.into_iter().enumerate() {
        match fix_one(book, config, client, &fetcher).await? {
            FixOutcome::Fixed => {
                stats.fixed += 1;
                if let Some(cb) = progress {
                    cb.on_book_complete(Stage::FixCovers, idx, total, book.name());
                }
            }
            FixOutcome::NoCoverElement => {
                stats.missing_cover += 1;
                if let Some(cb) = progress {
                    cb.on_book_skipped(Stage::FixCovers, idx, total, book.name(), "no cover on page");
                }
            }
            FixOutcome::Failed(err) => {
                warn!("Could not fix cover for '{}': {}", book.name(), err);
                stats.failed += 1;
                if let Some(cb) = progress {
                    cb.on_book_skipped(Stage::FixCovers, idx, total, book.name(), &err.to_string());
                }
            }
        }
        throttle.pause().await;
    }

    if let Some(cb) = progress {
        cb.on_stage_complete(Stage::FixCovers, total, stats.fixed);
    }

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Cover fix complete: {} fixed, {} without cover, {} failed",
        stats.fixed, stats.missing_cover, stats.failed
    );
    Ok(stats)
}

async fn fix_one(
    book: &Book,
    config: &SiteConfig,
    client: &reqwest::Client,
    fetcher: &ImageFetcher,
) -> Result<FixOutcome, BookshelfError> {
    let page_url = book.catalog_url();
    let html = match fetch_page(client, page_url).await {
        Ok(html) => html,
        Err(err) => return Ok(FixOutcome::Failed(err)),
    };

    let Some(cover_url) = scrape::find_cover_src(&html, &config.cover_element_id, page_url)? else {
        debug!("No #{} on {}", config.cover_element_id, page_url);
        return Ok(FixOutcome::NoCoverElement);
    };

    let original = format!("{ORIGINAL_PREFIX}{}", book.image_name);
    if let FetchOutcome::Failed(err) = fetcher.fetch(&cover_url, &original).await? {
        return Ok(FixOutcome::Failed(err));
    }

    let source = fetcher.path_for(&original);
    let target = fetcher.path_for(&book.image_name);
    match scrape::resize_to_width(&source, &target, config.cover_width).await {
        Ok((w, h)) => {
            info!("Fixed cover for '{}' ({}x{})", book.name(), w, h);
            Ok(FixOutcome::Fixed)
        }
        Err(err) => Ok(FixOutcome::Failed(err)),
    }
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, CoverError> {
    let transport = |e: reqwest::Error| CoverError::Transport {
        url: url.to_string(),
        detail: e.to_string(),
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(CoverError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(transport)
}
