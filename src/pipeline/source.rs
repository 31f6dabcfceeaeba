//! Source reader: parse the pipe-delimited book list.
//!
//! One book per line, four positional fields:
//!
//! ```text
//! Dune | Frank Herbert | 42 | alice
//! ```
//!
//! Fields are trimmed; blank lines are skipped. Anything else that does not
//! split into exactly four fields with an integer vote count aborts the run
//! before any network traffic.

use crate::book::BookEntry;
use crate::error::BookshelfError;
use std::path::Path;
use tracing::debug;

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 4;

/// Read and parse the book list at `path`.
pub async fn read_source(path: &Path) -> Result<Vec<BookEntry>, BookshelfError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BookshelfError::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BookshelfError::SourceRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let entries = parse_source(&text, path)?;
    debug!("Read {} books from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse book list text. `path` is only used for error messages.
pub fn parse_source(text: &str, path: &Path) -> Result<Vec<BookEntry>, BookshelfError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_line(line).map_err(|reason| BookshelfError::MalformedInput {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            })
        })
        .collect()
}

fn parse_line(line: &str) -> Result<BookEntry, String> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    let [name, author, votes, suggested_by] = fields.as_slice() else {
        return Err(format!(
            "expected {FIELD_COUNT} '{FIELD_SEPARATOR}'-separated fields, found {}",
            fields.len()
        ));
    };

    let votes = votes
        .parse::<u32>()
        .map_err(|_| format!("vote count '{votes}' is not a non-negative integer"))?;

    Ok(BookEntry {
        name: name.to_string(),
        author: author.to_string(),
        votes,
        suggested_by: suggested_by.to_string(),
    })
}
