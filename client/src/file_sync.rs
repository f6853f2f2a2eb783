//! Fetch-if-missing reconciliation of the server's file list against the
//! local cache. A failed file is skipped, never the whole batch.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use tracing::{info, debug, warn};

use crate::error::FetchError;
use crate::file_cache::LocalFileCache;

#[async_trait]
pub trait FileSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Bytes, FetchError>;
}

// Downloads files from the server's /files/{name} route
pub struct HttpFileSource {
    base: Url,
    http: reqwest::Client,
}

impl HttpFileSource {
    pub fn new(base: Url) -> Self {
        Self { base, http: reqwest::Client::new() }
    }

    pub fn url_for(&self, name: &str) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidName(name.to_owned()))?
            .pop_if_empty()
            .push("files")
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl FileSource for HttpFileSource {
    async fn fetch(&self, name: &str) -> Result<Bytes, FetchError> {
        let url = self.url_for(name)?;
        debug!("fetching {}", url);

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status { name: name.to_owned(), status: resp.status().as_u16() })
        }

        Ok(resp.bytes().await?)
    }
}

pub struct FileSync<S> {
    source: S,
    cache: LocalFileCache,
}

impl<S: FileSource> FileSync<S> {
    pub fn new(source: S, cache: LocalFileCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &LocalFileCache {
        &self.cache
    }

    // Make sure every listed name is on disk, returns the ones that are
    pub async fn ensure_local(&mut self, names: &[String]) -> BTreeSet<String> {
        let mut available = BTreeSet::new();
        let mut seen = HashSet::new();

        for name in names {
            if !seen.insert(name.as_str()) { continue }

            if self.cache.contains(name) {
                available.insert(name.clone());
                continue
            }

            match self.fetch_one(name).await {
                Ok(len) => {
                    info!("Fetched {} ({} bytes)", name, len);
                    self.cache.insert(name.clone());
                    available.insert(name.clone());
                },
                Err(e) => warn!("Unable to fetch {}: {}", name, e),
            }
        }

        available
    }

    async fn fetch_one(&self, name: &str) -> Result<usize, FetchError> {
        if !is_plain_name(name) {
            return Err(FetchError::InvalidName(name.to_owned()))
        }

        let body = self.source.fetch(name).await?;
        tokio::fs::write(self.cache.path_of(name), &body).await?;
        Ok(body.len())
    }
}

// a single path component, nothing that could escape the media dir
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
