//! Docsearch Core Library
//!
//! Configuration and error handling shared by the docsearch index, worker,
//! client and CLI crates.

pub mod config;
pub mod error;

pub use config::{Config, FieldBoosts, SearchConfig, ServerConfig};
pub use error::{CoreError, Result};
