//! Worker error types.

use std::path::PathBuf;

use docsearch_index::CorpusError;
use thiserror::Error;

/// Worker errors.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The corpus request could not be sent or its body read.
    #[error("Failed to fetch corpus: {0}")]
    Network(#[from] reqwest::Error),

    /// The corpus server answered with a non-success status.
    #[error("Corpus request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The corpus file could not be read.
    #[error("Failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus was fetched but could not be decoded.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// A request carried a payload of the wrong shape.
    #[error("Invalid payload for '{kind}': {message}")]
    Payload { kind: String, message: String },
}

/// Result type for worker operations.
pub type Result<T> = std::result::Result<T, WorkerError>;
