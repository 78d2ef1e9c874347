//! Command implementations.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use docsearch_core::Config;

pub mod encode;
pub mod query;
pub mod serve;

/// Load configuration from `path` plus `DOCSEARCH__*` environment overrides.
///
/// A missing file is not an error; every setting has a default.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load_with_env(path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))
}
