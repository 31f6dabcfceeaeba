//! Image fetcher: download a cover into the images directory once.
//!
//! The file name is the only cache key: if `images_dir/file_name` exists,
//! nothing is requested. Otherwise the body is streamed into a `.part` file
//! and renamed into place, so a failed or interrupted download never leaves
//! a file under the final name. Remote failures are reported as
//! [`FetchOutcome::Failed`] rather than errors; a later run simply tries
//! again.

use crate::error::{BookshelfError, CoverError};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// What happened to one fetch request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The file already existed; no request was made.
    Cached,
    /// The file was downloaded.
    Downloaded { bytes: u64 },
    /// The download failed; no file was written.
    Failed(CoverError),
}

/// Downloads files into a flat images directory.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    images_dir: PathBuf,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            images_dir: images_dir.into(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Full path of `file_name` inside the images directory.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.images_dir.join(file_name)
    }

    /// Ensure `file_name` exists, downloading it from `url` if needed.
    ///
    /// Only local filesystem failures are returned as errors.
    pub async fn fetch(&self, url: &str, file_name: &str) -> Result<FetchOutcome, BookshelfError> {
        let target = self.path_for(file_name);
        let cached = tokio::fs::try_exists(&target).await.map_err(|e| {
            BookshelfError::ImageWriteFailed {
                path: target.clone(),
                source: e,
            }
        })?;
        if cached {
            debug!("Cover cached: {}", target.display());
            return Ok(FetchOutcome::Cached);
        }

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(self.failed(CoverError::Transport {
                    url: url.to_string(),
                    detail: e.to_string(),
                }))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(self.failed(CoverError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        let partial = self.path_for(&format!("{file_name}.part"));
        match write_stream(response, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, &target).await.map_err(|e| {
                    BookshelfError::ImageWriteFailed {
                        path: target.clone(),
                        source: e,
                    }
                })?;
                debug!("Downloaded {} ({} bytes)", target.display(), bytes);
                Ok(FetchOutcome::Downloaded { bytes })
            }
            Err(StreamError::Remote(detail)) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Ok(self.failed(CoverError::Transport {
                    url: url.to_string(),
                    detail,
                }))
            }
            Err(StreamError::Local(source)) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(BookshelfError::ImageWriteFailed {
                    path: partial,
                    source,
                })
            }
        }
    }

    fn failed(&self, err: CoverError) -> FetchOutcome {
        warn!("Cover download failed: {}", err);
        FetchOutcome::Failed(err)
    }
}

enum StreamError {
    Remote(String),
    Local(std::io::Error),
}

async fn write_stream(response: reqwest::Response, path: &Path) -> Result<u64, StreamError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(StreamError::Local)?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StreamError::Remote(e.to_string()))?;
        file.write_all(&chunk).await.map_err(StreamError::Local)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(StreamError::Local)?;
    Ok(written)
}
