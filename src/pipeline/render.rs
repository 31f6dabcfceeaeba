//! Renderer: HTML page from a template, plus the JSON dump.
//!
//! The template receives a single variable, `books`, holding every [`Book`]
//! in source order with all twelve fields. Templates whose name ends in
//! `.html` get HTML auto-escaping.
//!
//! Artifacts are written to a sibling temp file and renamed over the target,
//! so every run replaces them whole.

use crate::book::Book;
use crate::error::BookshelfError;
use minijinja::{context, Environment};
use std::path::Path;
use tracing::debug;

/// Built-in page template, used when no `template_path` is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/index.html");

const TEMPLATE_NAME: &str = "index.html";

/// Load the configured template, or the built-in one.
pub async fn load_template(path: Option<&Path>) -> Result<String, BookshelfError> {
    match path {
        Some(p) => tokio::fs::read_to_string(p).await.map_err(|e| {
            BookshelfError::TemplateRender(format!("cannot read template '{}': {e}", p.display()))
        }),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// Render `books` through `template`.
pub fn render_html(books: &[Book], template: &str) -> Result<String, BookshelfError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, template)
        .map_err(|e| BookshelfError::TemplateRender(e.to_string()))?;

    env.get_template(TEMPLATE_NAME)
        .and_then(|tmpl| tmpl.render(context! { books => books }))
        .map_err(|e| BookshelfError::TemplateRender(e.to_string()))
}

/// Serialise `books` as a 2-space indented JSON array.
pub fn render_json(books: &[Book]) -> Result<String, BookshelfError> {
    Ok(serde_json::to_string_pretty(books)?)
}

/// Replace the file at `path` with `contents`.
pub async fn write_artifact(path: &Path, contents: &str) -> Result<(), BookshelfError> {
    let write_err = |source| BookshelfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
