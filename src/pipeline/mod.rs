//! Pipeline stages for building the bookshelf.
//!
//! Each submodule implements one step; the entry points in [`crate::site`]
//! and [`crate::fix`] chain them.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ enrich ──▶ covers ──▶ render
//! (file)    (catalog)  (fetch)    (HTML + JSON)
//!
//! output.json ──▶ scrape ──▶ fetch ──▶ resize      (fix-covers)
//! ```
//!
//! 1. [`source`]   parse the pipe-delimited book list
//! 2. [`enrich`]   one catalog lookup per book; unknown books are dropped
//! 3. [`covers`]   derive cover file names and download them via [`fetch`]
//! 4. [`render`]   template the HTML page and dump the JSON artifact
//! 5. [`scrape`]   find the real cover on a catalog page and resize it
//!
//! Every external call is awaited in order and followed by a [`throttle`]
//! pause; nothing runs concurrently.

pub mod covers;
pub mod enrich;
pub mod fetch;
pub mod render;
pub mod scrape;
pub mod source;
pub mod throttle;
