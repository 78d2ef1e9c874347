//! Docsearch Index Library
//!
//! Decodes the dictionary-compressed documentation corpus and answers text
//! queries against an in-memory inverted index.
//!
//! # Features
//!
//! - **Corpus codec**: pages ship `headings`, `keywords` and `members` as
//!   indices into one shared dictionary
//! - **Weighted fields**: topics, title, headings, members and keywords carry
//!   separate boosts
//! - **Staged queries**: every term required, then any term, then a title
//!   wildcard on the first term
//!
//! # Example
//!
//! ```
//! use docsearch_core::FieldBoosts;
//! use docsearch_index::{EncodedPages, QueryEngine, build_index};
//!
//! let corpus: EncodedPages = serde_json::from_str(
//!     r#"{"dictionary": "foo bar", "pages": [
//!         {"path": "guide/foo", "type": "guide", "title": "Foo Guide",
//!          "headings": [0], "keywords": [1], "members": [], "topics": "intro"}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let engine = QueryEngine::new(build_index(&corpus, &FieldBoosts::default()));
//! let results = engine.query("foo");
//! assert_eq!(results[0].path, "guide/foo");
//! ```

pub mod corpus;
pub mod engine;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod results;

pub use corpus::{
    DecodedPage, DecodedPageMap, Dictionary, EncodedPage, EncodedPages, PageInfo, SearchInfo,
};
pub use engine::{BuiltIndex, QueryEngine, build_index, strip_quotes};
pub use index::{Field, Hit, IndexBuilder, InvertedIndex, Searchable};
pub use query::{Clause, Presence, Query};
pub use results::{SearchResult, SearchResults};
use thiserror::Error;

/// Corpus errors.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus is not valid JSON or does not match the envelope shape.
    #[error("Malformed corpus: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Query syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A `field:` prefix named a field that is not indexed.
    #[error("unrecognised field '{field}', possible fields: {available}")]
    UnknownField { field: String, available: String },

    /// A presence operator or field prefix had no term after it.
    #[error("expecting term after '{0}', found nothing")]
    MissingTerm(String),

    /// A `^` modifier was not followed by a number.
    #[error("boost must be numeric, found '{0}'")]
    InvalidBoost(String),

    /// A `~` modifier was not followed by a whole number.
    #[error("edit distance must be numeric, found '{0}'")]
    InvalidEditDistance(String),
}

/// Result type for query parsing and execution.
pub type Result<T> = std::result::Result<T, QueryError>;
