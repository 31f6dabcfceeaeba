//! `build` entry point: source file in, HTML page and JSON dump out.

use crate::catalog::CatalogLookup;
use crate::config::SiteConfig;
use crate::error::BookshelfError;
use crate::output::{RunStats, SiteOutput};
use crate::pipeline::fetch::ImageFetcher;
use crate::pipeline::throttle::Throttle;
use crate::pipeline::{covers, enrich, render, source};
use std::time::Instant;
use tracing::{debug, info};

/// Run the whole pipeline once.
///
/// Steps, strictly in order: parse the source file, look every book up in
/// `catalog`, download missing covers with `client`, then render both
/// artifacts. A malformed source line fails before any request is sent; a
/// catalog transport failure fails before any artifact is written.
pub async fn build_site(
    config: &SiteConfig,
    catalog: &dyn CatalogLookup,
    client: &reqwest::Client,
) -> Result<SiteOutput, BookshelfError> {
    let total_start = Instant::now();
    let progress = config.progress_callback.as_ref();
    let throttle = Throttle::new(config.request_delay);
    info!("Building site from {}", config.source_path.display());

    // ── Step 1: Read source ──────────────────────────────────────────────
    let mut entries = source::read_source(&config.source_path).await?;
    let source_books = entries.len();
    if let Some(limit) = config.limit {
        entries.truncate(limit);
        debug!("Limiting lookups to the first {} of {} books", entries.len(), source_books);
    }

    // Load the template up front so a bad path fails before any request.
    let template = render::load_template(config.template_path.as_deref()).await?;

    let images_dir = config.images_dir();
    tokio::fs::create_dir_all(&images_dir)
        .await
        .map_err(|e| BookshelfError::ImageWriteFailed {
            path: images_dir.clone(),
            source: e,
        })?;

    // ── Step 2: Enrich ───────────────────────────────────────────────────
    let (enriched, enrich_stats) = enrich::enrich_books(entries, catalog, &throttle, progress).await?;

    // ── Step 3: Covers ───────────────────────────────────────────────────
    let fetcher = ImageFetcher::new(client.clone(), images_dir);
    let (books, cover_stats) = covers::attach_covers(enriched, &fetcher, &throttle, progress).await?;

    // ── Step 4: Render ───────────────────────────────────────────────────
    let html = render::render_html(&books, &template)?;
    let json = render::render_json(&books)?;

    let html_path = config.html_path();
    let json_path = config.json_path();
    render::write_artifact(&html_path, &html).await?;
    render::write_artifact(&json_path, &json).await?;

    let stats = RunStats {
        source_books,
        looked_up: enrich_stats.looked_up,
        enriched: enrich_stats.enriched,
        not_found: enrich_stats.not_found,
        covers_downloaded: cover_stats.downloaded,
        covers_cached: cover_stats.cached,
        covers_failed: cover_stats.failed,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Site built: {} books → {}, {}ms total",
        books.len(),
        html_path.display(),
        stats.total_duration_ms
    );

    Ok(SiteOutput {
        books,
        html_path,
        json_path,
        stats,
    })
}
