//! Log sink for the CLI: stderr plus an optional size-capped log file.
//!
//! The library itself only emits `tracing` events and never installs a
//! subscriber. [`init`] is called once by the binary; the returned
//! [`LogSink`] owns the file writer's background worker and flushes it when
//! dropped, so it must be kept alive until the process is done.
//!
//! Each output has its own filter: the terminal can stay quiet behind a
//! progress bar while the file still records every lookup and download.

use crate::error::BookshelfError;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the active log file; rotated copies get `.1`, `.2`, ... appended.
pub const LOG_FILE_NAME: &str = "bookshelf.log";

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Stderr filter directive when `RUST_LOG` is unset, e.g. `"error"`.
    pub level: String,
    /// File filter directive when `RUST_LOG` is unset.
    pub file_level: String,
    /// Directory for the log file. `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
    /// Size at which the active file is rotated.
    pub max_log_bytes: u64,
    /// How many rotated files to keep besides the active one.
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_level: "info".to_string(),
            log_dir: None,
            max_log_bytes: 10 * 1024 * 1024,
            max_log_files: 5,
        }
    }
}

/// Keeps the log file writer alive. Dropping it flushes pending lines.
#[must_use = "dropping the sink stops file logging"]
pub struct LogSink {
    _file_guard: Option<WorkerGuard>,
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Open `dir/bookshelf.log`, rotating once it reaches `max_bytes`.
pub fn file_appender(
    dir: &Path,
    max_bytes: u64,
    max_files: usize,
) -> Result<BasicRollingFileAppender, BookshelfError> {
    let open_err = |e: std::io::Error| {
        BookshelfError::InvalidConfig(format!(
            "cannot open log directory '{}': {e}",
            dir.display()
        ))
    };

    std::fs::create_dir_all(dir).map_err(open_err)?;
    BasicRollingFileAppender::new(
        dir.join(LOG_FILE_NAME),
        RollingConditionBasic::new().max_size(max_bytes.max(1)),
        max_files.max(1),
    )
    .map_err(open_err)
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) -> Result<LogSink, BookshelfError> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = file_appender(dir, config.max_log_bytes, config.max_log_files)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter(&config.file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter(&config.level)),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| BookshelfError::Internal(format!("logging already initialised: {e}")))?;

    Ok(LogSink {
        _file_guard: guard,
    })
}
