//! Where the worker fetches its corpus from.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tracing::debug;

use crate::{Result, WorkerError};

/// A source of encoded corpus JSON.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Fetch the raw corpus text.
    async fn fetch(&self) -> Result<String>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Fetches the corpus with an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpCorpusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCorpusSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    async fn fetch(&self) -> Result<String> {
        debug!(url = %self.url, "Fetching corpus");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the corpus from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCorpusSource {
    path: PathBuf,
}

impl FileCorpusSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSource for FileCorpusSource {
    async fn fetch(&self) -> Result<String> {
        debug!(path = %self.path.display(), "Reading corpus");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| WorkerError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a corpus held in memory.
#[derive(Debug, Clone)]
pub struct StaticCorpusSource {
    json: String,
}

impl StaticCorpusSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

#[async_trait]
impl CorpusSource for StaticCorpusSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        "<in-memory corpus>".to_string()
    }
}

/// Pick a source for a configured `data_url`.
///
/// `http://` and `https://` URLs are fetched over the network; anything else
/// is treated as a site-relative path under `root`.
pub fn corpus_source_for(url: &str, root: &Path) -> Arc<dyn CorpusSource> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Arc::new(HttpCorpusSource::new(url))
    } else {
        Arc::new(FileCorpusSource::new(root.join(url.trim_start_matches('/'))))
    }
}
