//! Configuration types for a bookshelf run.
//!
//! Every path and knob lives in [`SiteConfig`], built via its
//! [`SiteConfigBuilder`]. The same config drives both `build` and
//! `fix-covers`, so the fixer always looks in the directories the build wrote.

use crate::error::BookshelfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default catalog host (Open Library search API).
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://openlibrary.org";

/// Default cover image host.
pub const DEFAULT_COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

/// Stock image the catalog client reports for works without a cover.
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://openlibrary.org/images/icons/avatar_book-sm.png";

/// Substring of `image_url` that marks a placeholder cover.
pub const DEFAULT_PLACEHOLDER_MARKER: &str = "avatar_book";

/// `id` attribute of the cover `<img>` on a catalog detail page.
pub const DEFAULT_COVER_ELEMENT_ID: &str = "coverImage";

/// Width, in pixels, that repaired covers are resized to.
pub const DEFAULT_COVER_WIDTH: u32 = 98;

/// Configuration for a bookshelf run.
///
/// Built via [`SiteConfig::builder()`] or using [`SiteConfig::default()`].
///
/// # Example
/// ```rust
/// use bookshelf::SiteConfig;
/// use std::time::Duration;
///
/// let config = SiteConfig::builder()
///     .source_path("books.txt")
///     .output_dir("public")
///     .request_delay(Duration::ZERO)
///     .limit(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.images_dir(), std::path::Path::new("public/images"));
/// ```
#[derive(Clone)]
pub struct SiteConfig {
    /// Pipe-delimited book list. Default: `source.txt`.
    pub source_path: PathBuf,

    /// Directory receiving the HTML page and JSON dump. Default: `dist`.
    pub output_dir: PathBuf,

    /// Cover cache directory. Default: `{output_dir}/images`.
    pub images_dir: Option<PathBuf>,

    /// Delay after each external call. Default: 1 s. `Duration::ZERO` disables it.
    pub request_delay: Duration,

    /// Only look up the first N books. Default: all.
    pub limit: Option<usize>,

    /// Custom HTML template. Default: the built-in template.
    pub template_path: Option<PathBuf>,

    /// File name of the HTML page inside `output_dir`. Default: `index.html`.
    pub html_file_name: String,

    /// File name of the JSON dump inside `output_dir`. Default: `output.json`.
    pub json_file_name: String,

    /// Catalog search host. Default: [`DEFAULT_CATALOG_BASE_URL`].
    pub catalog_base_url: String,

    /// Cover host used to build image URLs. Default: [`DEFAULT_COVERS_BASE_URL`].
    pub covers_base_url: String,

    /// Image URL recorded for works without a cover. Default: [`DEFAULT_PLACEHOLDER_IMAGE_URL`].
    pub placeholder_image_url: String,

    /// Marks an `image_url` as a placeholder for `fix-covers`. Default: [`DEFAULT_PLACEHOLDER_MARKER`].
    pub placeholder_marker: String,

    /// `id` of the cover `<img>` scraped by `fix-covers`. Default: [`DEFAULT_COVER_ELEMENT_ID`].
    pub cover_element_id: String,

    /// Target width of repaired covers. Default: 98.
    pub cover_width: u32,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub http_timeout_secs: u64,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("source.txt"),
            output_dir: PathBuf::from("dist"),
            images_dir: None,
            request_delay: Duration::from_secs(1),
            limit: None,
            template_path: None,
            html_file_name: "index.html".to_string(),
            json_file_name: "output.json".to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            covers_base_url: DEFAULT_COVERS_BASE_URL.to_string(),
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            placeholder_marker: DEFAULT_PLACEHOLDER_MARKER.to_string(),
            cover_element_id: DEFAULT_COVER_ELEMENT_ID.to_string(),
            cover_width: DEFAULT_COVER_WIDTH,
            http_timeout_secs: 30,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("source_path", &self.source_path)
            .field("output_dir", &self.output_dir)
            .field("images_dir", &self.images_dir())
            .field("request_delay", &self.request_delay)
            .field("limit", &self.limit)
            .field("template_path", &self.template_path)
            .field("catalog_base_url", &self.catalog_base_url)
            .field("placeholder_marker", &self.placeholder_marker)
            .field("cover_element_id", &self.cover_element_id)
            .field("cover_width", &self.cover_width)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl SiteConfig {
    /// Create a new builder for `SiteConfig`.
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolved cover cache directory.
    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("images"))
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(&self.html_file_name)
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(&self.json_file_name)
    }

    /// Build the HTTP client shared by every stage of a run.
    pub fn http_client(&self) -> Result<reqwest::Client, BookshelfError> {
        reqwest::Client::builder()
            .user_agent(concat!("bookshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .build()
            .map_err(|e| BookshelfError::Internal(format!("HTTP client: {e}")))
    }
}

/// Builder for [`SiteConfig`].
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.images_dir = Some(dir.into());
        self
    }

    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.config.request_delay = delay;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.config.limit = Some(n);
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = Some(path.into());
        self
    }

    pub fn html_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.html_file_name = name.into();
        self
    }

    pub fn json_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.json_file_name = name.into();
        self
    }

    pub fn catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn covers_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.covers_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn placeholder_image_url(mut self, url: impl Into<String>) -> Self {
        self.config.placeholder_image_url = url.into();
        self
    }

    pub fn placeholder_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.placeholder_marker = marker.into();
        self
    }

    pub fn cover_element_id(mut self, id: impl Into<String>) -> Self {
        self.config.cover_element_id = id.into();
        self
    }

    pub fn cover_width(mut self, width: u32) -> Self {
        self.config.cover_width = width;
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SiteConfig, BookshelfError> {
        let c = &self.config;
        if c.limit == Some(0) {
            return Err(BookshelfError::InvalidConfig("Limit must be ≥ 1".into()));
        }
        if c.cover_width == 0 {
            return Err(BookshelfError::InvalidConfig(
                "Cover width must be ≥ 1".into(),
            ));
        }
        if c.placeholder_marker.is_empty() {
            return Err(BookshelfError::InvalidConfig(
                "Placeholder marker must not be empty".into(),
            ));
        }
        if !is_css_identifier(&c.cover_element_id) {
            return Err(BookshelfError::InvalidConfig(format!(
                "Cover element id '{}' is not a valid HTML id",
                c.cover_element_id
            )));
        }
        for name in [&c.html_file_name, &c.json_file_name] {
            if name.is_empty() || Path::new(name).components().count() != 1 {
                return Err(BookshelfError::InvalidConfig(format!(
                    "Output file name '{name}' must be a plain file name"
                )));
            }
        }
        Ok(self.config)
    }
}

/// `id` values usable in an `img#id` selector without escaping.
fn is_css_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
