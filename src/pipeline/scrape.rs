//! Cover repair helpers: find the real cover on a catalog page, shrink it.
//!
//! Catalog search results sometimes point at a stock "no cover" image even
//! though the book's detail page shows a real one. [`find_cover_src`] pulls
//! that image's URL out of the page HTML and [`resize_to_width`] scales the
//! downloaded original down to the width used for every other cover.

use crate::error::{BookshelfError, CoverError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use reqwest::Url;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use tracing::debug;

/// URL of the first `<img id="{element_id}">` in `html`, resolved against
/// `page_url`. `None` when the page has no such element or it has no `src`.
pub fn find_cover_src(
    html: &str,
    element_id: &str,
    page_url: &str,
) -> Result<Option<String>, BookshelfError> {
    let selector = Selector::parse(&format!("img#{element_id}")).map_err(|e| {
        BookshelfError::InvalidConfig(format!("cover element id '{element_id}': {e}"))
    })?;

    let document = Html::parse_document(html);
    let Some(src) = document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Ok(None);
    };

    let resolved = match Url::parse(page_url).and_then(|base| base.join(src)) {
        Ok(url) => url.to_string(),
        Err(_) => src.to_string(),
    };
    debug!(page_url, cover = %resolved, "Found cover element");
    Ok(Some(resolved))
}

/// Decode `source`, scale it to `width` pixels wide keeping its aspect
/// ratio, and write it to `target` in the format implied by its extension.
///
/// The source format is sniffed from its content, since the original is
/// stored under the placeholder's file name whatever its real format.
/// Images already at most `width` wide are re-encoded unscaled. Decoding
/// and resizing run on the blocking pool.
pub async fn resize_to_width(
    source: &Path,
    target: &Path,
    width: u32,
) -> Result<(u32, u32), CoverError> {
    let source: PathBuf = source.to_path_buf();
    let target: PathBuf = target.to_path_buf();
    let label = target.display().to_string();

    tokio::task::spawn_blocking(move || resize_blocking(&source, &target, width))
        .await
        .map_err(|e| CoverError::Image {
            path: label,
            detail: format!("resize task panicked: {e}"),
        })?
}

fn resize_blocking(source: &Path, target: &Path, width: u32) -> Result<(u32, u32), CoverError> {
    let image_err = |detail: String| CoverError::Image {
        path: source.display().to_string(),
        detail,
    };

    let img = ImageReader::open(source)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| image_err(e.to_string()))?
        .decode()
        .map_err(|e| image_err(e.to_string()))?;
    let (w, h) = (img.width(), img.height());

    let resized = if w > width {
        let height = ((h as f64) * (width as f64) / (w as f64)).round().max(1.0) as u32;
        img.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        img
    };

    let format = ImageFormat::from_path(target)
        .map_err(|e| image_err(format!("cannot write {}: {e}", target.display())))?;
    // JPEG has no alpha channel.
    let resized = if format == ImageFormat::Jpeg && resized.color().has_alpha() {
        DynamicImage::ImageRgb8(resized.to_rgb8())
    } else {
        resized
    };

    resized
        .save_with_format(target, format)
        .map_err(|e| image_err(format!("cannot write {}: {e}", target.display())))?;

    debug!(
        "Resized {} {}x{} → {}x{}",
        source.display(),
        w,
        h,
        resized.width(),
        resized.height()
    );
    Ok((resized.width(), resized.height()))
}
