//! Docsearch Worker
//!
//! The background task that owns the search index. It fetches the encoded
//! corpus on the first `load-index` message, builds the index once, and answers
//! `query-index` messages over an asynchronous channel.

pub mod error;
pub mod protocol;
pub mod source;
pub mod worker;

pub use error::{Result, WorkerError};
pub use protocol::{
    Envelope, ErrorPayload, INVALID_MESSAGE_TYPE, LOAD_INDEX, QUERY_INDEX, QueryResponse, Request,
};
pub use source::{
    CorpusSource, FileCorpusSource, HttpCorpusSource, StaticCorpusSource, corpus_source_for,
};
pub use worker::{SearchWorker, WorkerChannel, WorkerEvent};
