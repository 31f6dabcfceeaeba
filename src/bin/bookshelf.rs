//! CLI binary for bookshelf.
//!
//! A thin shim over the library crate that maps CLI flags to `SiteConfig`,
//! installs the log sink, and prints a summary.

use anyhow::{Context, Result};
use bookshelf::logging::{self, LogConfig};
use bookshelf::{
    build_site, fix_covers, OpenLibraryCatalog, PipelineProgressCallback, ProgressCallback,
    SiteConfig, Stage,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per stage plus a line per skipped book.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} books  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix(stage.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.skipped.store(0, Ordering::SeqCst);
    }

    fn on_book_complete(&self, _stage: Stage, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }

    fn on_book_skipped(&self, _stage: Stage, _index: usize, _total: usize, name: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), name, dim(reason)));
        self.bar.inc(1);
    }

    fn on_stage_complete(&self, stage: Stage, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        let mark = if skipped == 0 { green("✔") } else { cyan("⚠") };
        eprintln!(
            "{} {}: {}/{} books",
            mark,
            stage,
            bold(&success_count.to_string()),
            total
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Build dist/index.html and dist/output.json from source.txt
  bookshelf build

  # Custom paths, only the first 10 books, no throttling
  bookshelf build --source books.txt --output-dir public --limit 10 --delay-ms 0

  # Use your own page template (minijinja / Jinja2 syntax, `books` in context)
  bookshelf build --template my-template.html

  # Replace placeholder covers listed in dist/output.json
  bookshelf fix-covers

SOURCE FORMAT:
  One book per line, four '|'-separated fields:
    Dune | Frank Herbert | 42 | alice

ENVIRONMENT VARIABLES:
  RUST_LOG   Override the log filter (e.g. bookshelf=debug)
"#;

/// Build a static reading-list page from a plain-text book list.
#[derive(Parser, Debug)]
#[command(
    name = "bookshelf",
    version,
    about = "Build a static reading-list page enriched with catalog metadata and covers",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up every book, download covers, render HTML and JSON.
    Build(BuildArgs),
    /// Replace placeholder covers using the catalog's book pages.
    FixCovers(FixArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory for index.html and output.json.
    #[arg(long, global = true, env = "BOOKSHELF_OUTPUT_DIR", default_value = "dist")]
    output_dir: PathBuf,

    /// Cover cache directory [default: <OUTPUT_DIR>/images].
    #[arg(long, global = true, env = "BOOKSHELF_IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    /// Pause after each external request, in milliseconds.
    #[arg(long, global = true, env = "BOOKSHELF_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, global = true, env = "BOOKSHELF_HTTP_TIMEOUT", default_value_t = 30)]
    http_timeout: u64,

    /// Write rotated log files into this directory.
    #[arg(long, global = true, env = "BOOKSHELF_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Rotate the log file once it reaches this many megabytes.
    #[arg(long, global = true, env = "BOOKSHELF_MAX_LOG_MB", default_value_t = 10)]
    max_log_mb: u64,

    /// Rotated log files to keep.
    #[arg(long, global = true, env = "BOOKSHELF_MAX_LOG_FILES", default_value_t = 5)]
    max_log_files: usize,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "BOOKSHELF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level logs.
    #[arg(short, long, global = true, env = "BOOKSHELF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "BOOKSHELF_QUIET")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Pipe-delimited book list.
    #[arg(long, env = "BOOKSHELF_SOURCE", default_value = "source.txt")]
    source: PathBuf,

    /// Only look up the first N books.
    #[arg(long, env = "BOOKSHELF_LIMIT")]
    limit: Option<usize>,

    /// Custom HTML template.
    #[arg(long, env = "BOOKSHELF_TEMPLATE")]
    template: Option<PathBuf>,

    /// Catalog host.
    #[arg(long, env = "BOOKSHELF_CATALOG_URL", default_value = bookshelf::config::DEFAULT_CATALOG_BASE_URL)]
    catalog_url: String,

    /// Cover image host.
    #[arg(long, env = "BOOKSHELF_COVERS_URL", default_value = bookshelf::config::DEFAULT_COVERS_BASE_URL)]
    covers_url: String,
}

#[derive(Args, Debug)]
struct FixArgs {
    /// Substring that marks a placeholder image URL.
    #[arg(long, env = "BOOKSHELF_PLACEHOLDER_MARKER", default_value = bookshelf::config::DEFAULT_PLACEHOLDER_MARKER)]
    placeholder_marker: String,

    /// `id` of the cover <img> on the catalog page.
    #[arg(long, env = "BOOKSHELF_COVER_ELEMENT_ID", default_value = bookshelf::config::DEFAULT_COVER_ELEMENT_ID)]
    cover_element_id: String,

    /// Width of repaired covers in pixels.
    #[arg(long, env = "BOOKSHELF_COVER_WIDTH", default_value_t = bookshelf::config::DEFAULT_COVER_WIDTH)]
    cover_width: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO chatter on the terminal unless asked;
    // the log file always keeps it.
    let show_progress = !common.quiet && !common.no_progress;
    let level = if common.verbose {
        "debug"
    } else if common.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let file_level = if common.verbose { "debug" } else { "info" };
    let _log_sink = logging::init(&LogConfig {
        level: level.to_string(),
        file_level: file_level.to_string(),
        log_dir: common.log_dir.clone(),
        max_log_bytes: common.max_log_mb.saturating_mul(1024 * 1024),
        max_log_files: common.max_log_files,
    })
    .context("Failed to initialise logging")?;

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    match &cli.command {
        Command::Build(args) => {
            let config = build_config(common, progress, |b| {
                let mut b = b
                    .source_path(&args.source)
                    .catalog_base_url(&args.catalog_url)
                    .covers_base_url(&args.covers_url);
                if let Some(n) = args.limit {
                    b = b.limit(n);
                }
                if let Some(ref t) = args.template {
                    b = b.template_path(t);
                }
                b
            })?;

            let client = config.http_client()?;
            let catalog = OpenLibraryCatalog::new(client.clone(), &config);
            let output = build_site(&config, &catalog, &client)
                .await
                .context("Build failed")?;

            if !common.quiet {
                let s = &output.stats;
                eprintln!(
                    "{}  {}/{} books  {}ms  →  {}",
                    if s.not_found == 0 && s.covers_failed == 0 {
                        green("✔")
                    } else {
                        cyan("⚠")
                    },
                    s.enriched,
                    s.looked_up,
                    s.total_duration_ms,
                    bold(&output.html_path.display().to_string()),
                );
                eprintln!(
                    "   {} not found  /  covers: {} new, {} cached, {} failed",
                    dim(&s.not_found.to_string()),
                    s.covers_downloaded,
                    s.covers_cached,
                    if s.covers_failed == 0 {
                        s.covers_failed.to_string()
                    } else {
                        red(&s.covers_failed.to_string())
                    },
                );
            }
        }
        Command::FixCovers(args) => {
            let config = build_config(common, progress, |b| {
                b.placeholder_marker(&args.placeholder_marker)
                    .cover_element_id(&args.cover_element_id)
                    .cover_width(args.cover_width)
            })?;

            let client = config.http_client()?;
            let stats = fix_covers(&config, &client)
                .await
                .context("Cover fix failed")?;

            if !common.quiet {
                eprintln!(
                    "{}  {} fixed  /  {} placeholders  /  {} without cover  /  {} failed  {}ms",
                    if stats.failed == 0 { green("✔") } else { cyan("⚠") },
                    bold(&stats.fixed.to_string()),
                    stats.candidates,
                    stats.missing_cover,
                    stats.failed,
                    stats.total_duration_ms,
                );
            }
        }
    }

    Ok(())
}

/// Map shared CLI args to a `SiteConfig`, letting the subcommand add its own.
fn build_config(
    common: &CommonArgs,
    progress: Option<ProgressCallback>,
    subcommand: impl FnOnce(bookshelf::SiteConfigBuilder) -> bookshelf::SiteConfigBuilder,
) -> Result<SiteConfig> {
    let mut builder = SiteConfig::builder()
        .output_dir(&common.output_dir)
        .request_delay(Duration::from_millis(common.delay_ms))
        .http_timeout_secs(common.http_timeout);

    if let Some(ref dir) = common.images_dir {
        builder = builder.images_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    subcommand(builder).build().context("Invalid configuration")
}
