//! Docsearch Client
//!
//! The consumer side of the search worker:
//!
//! - [`WorkerClient`] correlates requests and responses by message type and id
//! - [`SearchClient`] starts the worker lazily and exposes `initialize` and
//!   `search`
//! - [`group_results`] buckets a flat result list into display areas

pub mod areas;
pub mod error;
pub mod fallback;
pub mod rpc;
pub mod search;

pub use areas::{
    DEFAULT_PRIORITY_LIMIT, OTHER_AREA, SearchResultArea, SearchState, area_for_path, group_results,
};
pub use error::{ClientError, Result};
pub use fallback::{decode_search_param, query_from_path, related_pages};
pub use rpc::WorkerClient;
pub use search::{SearchClient, WorkerFactory};
