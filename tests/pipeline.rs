//! End-to-end tests for `build_site` and `fix_covers`.
//!
//! The catalog and image hosts are replaced by a local HTTP server
//! (`tests/common`), so these run offline.

mod common;

use async_trait::async_trait;
use bookshelf::pipeline::render::render_json;
use bookshelf::{
    build_site, fix_covers, Book, BookEntry, BookshelfError, CatalogLookup, CatalogRecord,
    EnrichedBook, LookupError, OpenLibraryCatalog, SiteConfig,
};
use common::{client, jpeg, png, Route, TestServer};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn config_for(dir: &Path, server: &TestServer) -> SiteConfig {
    SiteConfig::builder()
        .source_path(dir.join("source.txt"))
        .output_dir(dir.join("dist"))
        .request_delay(Duration::ZERO)
        .catalog_base_url(&server.base_url)
        .covers_base_url(&server.base_url)
        .build()
        .unwrap()
}

fn search_hit(key: &str, cover_i: i64) -> Route {
    Route::json(json!({
        "numFound": 1,
        "docs": [{
            "key": key,
            "cover_i": cover_i,
            "first_publish_year": 1965,
            "number_of_pages_median": 604,
            "ratings_average": 4.25,
            "ratings_count": 1200
        }]
    }))
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn placeholder_book(server: &TestServer, id: &str, image_name: &str) -> Book {
    Book {
        book: EnrichedBook::new(
            BookEntry {
                name: format!("Book {id}"),
                author: "Anon".into(),
                votes: 1,
                suggested_by: "dave".into(),
            },
            CatalogRecord {
                image_url: bookshelf::config::DEFAULT_PLACEHOLDER_IMAGE_URL.into(),
                publication_year: 1999,
                num_pages: 10,
                average_rating: 3.0,
                ratings_count: 1,
                catalog_url: server.url(&format!("/works/{id}")),
                catalog_id: id.into(),
            },
        ),
        image_name: image_name.into(),
    }
}

/// Catalog that only knows the books it was given.
struct KnownBooks(Vec<(&'static str, CatalogRecord)>);

#[async_trait]
impl CatalogLookup for KnownBooks {
    async fn lookup(&self, query: &str) -> Result<CatalogRecord, LookupError> {
        self.0
            .iter()
            .find(|(q, _)| *q == query)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| LookupError::NotFound {
                query: query.to_string(),
            })
    }
}

// ── build ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_build_single_book_end_to_end() {
    let cover = b"\xFF\xD8\xFF fake jpeg bytes".to_vec();
    let server = TestServer::start(vec![
        ("/search.json", search_hit("/works/12345", 777)),
        ("/b/id/777-M.jpg", Route::ok("image/jpeg", cover.clone())),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("source.txt"), "Dune | Frank Herbert | 42 | alice\n").unwrap();
    let config = config_for(dir.path(), &server);

    let output = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .expect("build should succeed");

    assert_eq!(output.books.len(), 1);
    assert_eq!(output.books[0].image_name, "12345.jpg");
    assert_eq!(output.stats.covers_downloaded, 1);

    let json = read_json(&dir.path().join("dist/output.json"));
    let books = json.as_array().unwrap();
    assert_eq!(books.len(), 1);
    let book = books[0].as_object().unwrap();
    assert_eq!(book.len(), 12, "got keys: {:?}", book.keys().collect::<Vec<_>>());
    assert_eq!(book["name"], "Dune");
    assert_eq!(book["author"], "Frank Herbert");
    assert_eq!(book["votes"], 42);
    assert_eq!(book["suggested_by"], "alice");
    assert_eq!(book["catalog_id"], "12345");
    assert_eq!(book["catalog_url"], server.url("/works/12345"));
    assert_eq!(book["image_url"], server.url("/b/id/777-M.jpg"));
    assert_eq!(book["publication_year"], 1965);
    assert_eq!(book["image_name"], "12345.jpg");

    let image = std::fs::read(dir.path().join("dist/images/12345.jpg")).unwrap();
    assert_eq!(image, cover);

    let html = std::fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
    assert!(html.contains("Dune"));
    assert!(html.contains("images/12345.jpg"));
}

#[tokio::test]
async fn test_shared_catalog_id_downloads_cover_once() {
    let server = TestServer::start(vec![
        ("/search.json", search_hit("/works/OL1W", 5)),
        ("/b/id/5-M.jpg", Route::ok("image/jpeg", b"jpeg".to_vec())),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("source.txt"),
        "Dune | Frank Herbert | 42 | alice\nDune (reissue) | Frank Herbert | 3 | bob\n",
    )
    .unwrap();
    let config = config_for(dir.path(), &server);

    let output = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap();

    assert_eq!(output.books.len(), 2);
    assert!(output.books.iter().all(|b| b.image_name == "OL1W.jpg"));
    assert_eq!(server.hits("/b/id/5-M.jpg"), 1);
    assert_eq!(output.stats.covers_downloaded, 1);
    assert_eq!(output.stats.covers_cached, 1);
}

#[tokio::test]
async fn test_rebuild_overwrites_artifacts_and_reuses_covers() {
    let server = TestServer::start(vec![
        ("/search.json", search_hit("/works/OL2W", 9)),
        ("/b/id/9-M.jpg", Route::ok("image/jpeg", b"jpeg".to_vec())),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.txt");
    let config = config_for(dir.path(), &server);
    let catalog = OpenLibraryCatalog::new(client(), &config);

    std::fs::write(&source, "A | X | 1 | a\nB | Y | 2 | b\nC | Z | 3 | c\n").unwrap();
    build_site(&config, &catalog, &client()).await.unwrap();
    assert_eq!(read_json(&config.json_path()).as_array().unwrap().len(), 3);

    std::fs::write(&source, "A | X | 1 | a\n").unwrap();
    let second = build_site(&config, &catalog, &client()).await.unwrap();

    assert_eq!(read_json(&config.json_path()).as_array().unwrap().len(), 1);
    let html = std::fs::read_to_string(config.html_path()).unwrap();
    assert_eq!(html.matches("class=\"book\"").count(), 1);
    assert_eq!(second.stats.covers_cached, 1);
    assert_eq!(server.hits("/b/id/9-M.jpg"), 1);
}

#[tokio::test]
async fn test_unknown_books_are_left_out() {
    let server = TestServer::start(vec![("/c/1.jpg", Route::ok("image/jpeg", b"1".to_vec()))]).await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("source.txt"),
        "Dune | Frank Herbert | 42 | alice\nMystery | Nobody | 1 | bob\n",
    )
    .unwrap();
    let config = config_for(dir.path(), &server);
    let catalog = KnownBooks(vec![(
        "Dune Frank Herbert",
        CatalogRecord {
            image_url: server.url("/c/1.jpg"),
            publication_year: 1965,
            num_pages: 604,
            average_rating: 4.2,
            ratings_count: 9,
            catalog_url: server.url("/works/1"),
            catalog_id: "1".into(),
        },
    )]);

    let output = build_site(&config, &catalog, &client()).await.unwrap();

    assert_eq!(output.stats.not_found, 1);
    let json = read_json(&config.json_path());
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dune"]);
}

#[tokio::test]
async fn test_limit_only_looks_up_first_books() {
    let server = TestServer::start(vec![
        ("/search.json", search_hit("/works/OL3W", 3)),
        ("/b/id/3-M.jpg", Route::ok("image/jpeg", b"jpeg".to_vec())),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("source.txt"), "A | X | 1 | a\nB | Y | 2 | b\nC | Z | 3 | c\n")
        .unwrap();
    let config = SiteConfig::builder()
        .source_path(dir.path().join("source.txt"))
        .output_dir(dir.path().join("dist"))
        .request_delay(Duration::ZERO)
        .catalog_base_url(&server.base_url)
        .covers_base_url(&server.base_url)
        .limit(2)
        .build()
        .unwrap();

    let output = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap();

    assert_eq!(output.stats.source_books, 3);
    assert_eq!(output.stats.looked_up, 2);
    assert_eq!(server.hits("/search.json"), 2);
}

#[tokio::test]
async fn test_malformed_source_fails_before_network() {
    let server = TestServer::start(vec![("/search.json", search_hit("/works/OL1W", 1))]).await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("source.txt"),
        "Dune | Frank Herbert | 42 | alice\nBroken line without fields\n",
    )
    .unwrap();
    let config = config_for(dir.path(), &server);

    let err = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap_err();

    assert!(matches!(err, BookshelfError::MalformedInput { line: 2, .. }), "got: {err:?}");
    assert_eq!(server.total_hits(), 0);
    assert!(!config.json_path().exists());
}

#[tokio::test]
async fn test_catalog_outage_aborts_without_artifacts() {
    let server = TestServer::start(vec![("/search.json", Route::status(503))]).await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("source.txt"), "Dune | Frank Herbert | 42 | alice\n").unwrap();
    let config = config_for(dir.path(), &server);

    let err = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap_err();

    assert!(matches!(err, BookshelfError::LookupFailed { .. }), "got: {err:?}");
    assert!(!config.json_path().exists());
    assert!(!config.html_path().exists());
}

#[tokio::test]
async fn test_empty_search_result_drops_book() {
    let server = TestServer::start(vec![(
        "/search.json",
        Route::json(json!({ "numFound": 0, "docs": [] })),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("source.txt"), "Nothing | Nobody | 0 | eve\n").unwrap();
    let config = config_for(dir.path(), &server);

    let output = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap();

    assert!(output.books.is_empty());
    assert_eq!(output.stats.not_found, 1);
    assert_eq!(read_json(&config.json_path()), json!([]));
}

#[tokio::test]
async fn test_failed_cover_download_keeps_book_without_file() {
    // No route for the cover: the server answers 404.
    let server = TestServer::start(vec![("/search.json", search_hit("/works/OL4W", 4))]).await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("source.txt"), "Dune | Frank Herbert | 42 | alice\n").unwrap();
    let config = config_for(dir.path(), &server);

    let output = build_site(&config, &OpenLibraryCatalog::new(client(), &config), &client())
        .await
        .unwrap();

    assert_eq!(output.books.len(), 1);
    assert_eq!(output.books[0].image_name, "OL4W.jpg");
    assert_eq!(output.stats.covers_failed, 1);
    assert!(!config.images_dir().join("OL4W.jpg").exists());
    assert!(!config.images_dir().join("OL4W.jpg.part").exists());
}

// ── fix-covers ───────────────────────────────────────────────────────────────

async fn write_artifact(config: &SiteConfig, books: &[Book]) {
    std::fs::create_dir_all(config.images_dir()).unwrap();
    std::fs::write(config.json_path(), render_json(books).unwrap()).unwrap();
}

#[tokio::test]
async fn test_fix_leaves_cover_when_page_has_no_element() {
    let server = TestServer::start(vec![(
        "/works/OL7W",
        Route::ok("text/html", "<html><body><img id=\"banner\" src=\"/b.png\"></body></html>"),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);
    write_artifact(&config, &[placeholder_book(&server, "OL7W", "OL7W.png")]).await;
    std::fs::write(config.images_dir().join("OL7W.png"), b"placeholder").unwrap();

    let stats = fix_covers(&config, &client()).await.expect("no error");

    assert_eq!(stats.candidates, 1);
    assert_eq!(stats.missing_cover, 1);
    assert_eq!(stats.fixed, 0);
    assert_eq!(
        std::fs::read(config.images_dir().join("OL7W.png")).unwrap(),
        b"placeholder"
    );
}

#[tokio::test]
async fn test_fix_replaces_placeholder_with_resized_cover() {
    let server = TestServer::start(vec![
        (
            "/works/OL8W",
            Route::ok(
                "text/html",
                "<html><body><img id=\"coverImage\" src=\"/big/8.png\"></body></html>",
            ),
        ),
        ("/big/8.png", Route::ok("image/png", png(300, 450))),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);
    write_artifact(&config, &[placeholder_book(&server, "OL8W", "OL8W.png")]).await;
    std::fs::write(config.images_dir().join("OL8W.png"), png(40, 60)).unwrap();
    let artifact_before = std::fs::read(config.json_path()).unwrap();

    let stats = fix_covers(&config, &client()).await.unwrap();

    assert_eq!(stats.fixed, 1);
    let fixed = image::open(config.images_dir().join("OL8W.png")).unwrap();
    assert_eq!((fixed.width(), fixed.height()), (98, 147));
    let original = image::open(config.images_dir().join("orig_OL8W.png")).unwrap();
    assert_eq!(original.width(), 300);
    assert_eq!(std::fs::read(config.json_path()).unwrap(), artifact_before);
}

#[tokio::test]
async fn test_fix_handles_jpeg_cover_behind_png_placeholder() {
    // The default placeholder is a PNG, so `image_name` ends in `.png` while
    // the scraped cover is a JPEG.
    let server = TestServer::start(vec![
        (
            "/works/OL11W",
            Route::ok(
                "text/html",
                "<html><body><img id=\"coverImage\" src=\"/b/id/11-L.jpg\"></body></html>",
            ),
        ),
        ("/b/id/11-L.jpg", Route::ok("image/jpeg", jpeg(300, 450))),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);
    let book = placeholder_book(&server, "OL11W", "OL11W.png");
    assert!(book.image_url().ends_with(".png"));
    write_artifact(&config, &[book]).await;

    let stats = fix_covers(&config, &client()).await.unwrap();

    assert_eq!(stats.fixed, 1, "stats: {stats:?}");
    assert_eq!(stats.failed, 0);
    let fixed = image::open(config.images_dir().join("OL11W.png")).unwrap();
    assert_eq!((fixed.width(), fixed.height()), (98, 147));
}

#[tokio::test]
async fn test_fix_ignores_books_with_real_covers() {
    let server = TestServer::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);
    let mut book = placeholder_book(&server, "OL9W", "OL9W.jpg");
    book.book.record.image_url = "https://covers.test/b/id/9-M.jpg".into();
    write_artifact(&config, &[book]).await;

    let stats = fix_covers(&config, &client()).await.unwrap();

    assert_eq!(stats.books, 1);
    assert_eq!(stats.candidates, 0);
    assert_eq!(server.total_hits(), 0);
}

#[tokio::test]
async fn test_fix_page_error_is_not_fatal() {
    // Catalog page route missing: 404.
    let server = TestServer::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);
    write_artifact(&config, &[placeholder_book(&server, "OL10W", "OL10W.png")]).await;

    let stats = fix_covers(&config, &client()).await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(server.hits("/works/OL10W"), 1);
}

#[tokio::test]
async fn test_fix_without_artifact_fails() {
    let server = TestServer::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &server);

    let err = fix_covers(&config, &client()).await.unwrap_err();
    assert!(matches!(err, BookshelfError::ArtifactNotFound { .. }), "got: {err:?}");
}
