//! Where table bytes come from
//!
//! A request names its tables with a `bucket` and a key per table. A bucket
//! that is an `http://` or `https://` URL is fetched over HTTP; anything
//! else is a directory under the service's data root.

use super::error::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use url::Url;

/// Fetches raw table bytes by key
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, SourceError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Short label for metrics: "fs" or "http"
    fn kind(&self) -> &'static str;
}

/// Reads tables from a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsTableSource {
    dir: PathBuf,
}

impl FsTableSource {
    /// Source rooted at `data_root/bucket`
    pub fn new(data_root: &Path, bucket: &str) -> Result<Self, SourceError> {
        let bucket = relative_path(bucket)?;
        Ok(Self {
            dir: data_root.join(bucket),
        })
    }
}

#[async_trait]
impl TableSource for FsTableSource {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.dir.join(relative_path(key)?);
        debug!(path = %path.display(), "Reading table from disk");

        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    key: key.to_string(),
                }
            } else {
                SourceError::Io {
                    key: key.to_string(),
                    source: e,
                }
            }
        })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn kind(&self) -> &'static str {
        "fs"
    }
}

/// Fetches tables from an HTTP(S) bucket URL
#[derive(Debug, Clone)]
pub struct HttpTableSource {
    client: Client,
    base_url: Url,
}

impl HttpTableSource {
    pub fn new(client: Client, bucket_url: &str) -> Result<Self, SourceError> {
        let mut base_url = Url::parse(bucket_url)?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    fn url_for(&self, key: &str) -> Result<Url, SourceError> {
        relative_path(key)?;
        Ok(self.base_url.join(key)?)
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        let url = self.url_for(key)?;
        debug!(url = %url, "Fetching table over HTTP");

        let http_err = |source| SourceError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(http_err)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_err)?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}

/// Pick the source implementation for a bucket
pub fn open_source(
    bucket: &str,
    data_root: &Path,
    client: &Client,
) -> Result<Box<dyn TableSource>, SourceError> {
    if bucket.starts_with("http://") || bucket.starts_with("https://") {
        Ok(Box::new(HttpTableSource::new(client.clone(), bucket)?))
    } else {
        Ok(Box::new(FsTableSource::new(data_root, bucket)?))
    }
}

/// Accept only plain relative paths so a key cannot escape its bucket
fn relative_path(key: &str) -> Result<&Path, SourceError> {
    let path = Path::new(key);
    let plain = !key.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(SourceError::InvalidKey(key.to_string()))
    }
}
