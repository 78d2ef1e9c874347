//! Docsearch CLI Library
//!
//! This library provides the functionality behind the `docsearch` binary:
//! encoding a page corpus, querying it from the terminal, and serving it
//! together with a JSON search API.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (encode, query, serve)
//! - [`server`] - Static file server with search endpoints
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use docsearch::cmd;
//!
//! // Encode page metadata into a search corpus
//! cmd::encode::run(Path::new("pages.json"), Path::new("search-data.json")).unwrap();
//! ```

pub mod cmd;
pub mod server;

// Re-export core types for convenience
pub use docsearch_client::{SearchClient, group_results};
pub use docsearch_core::Config;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// docsearch::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
