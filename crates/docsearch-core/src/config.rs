//! Search and server configuration.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for docsearch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Development server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Location of the encoded corpus. Either an `http(s)://` URL or a
    /// site-absolute path resolved against `server.root`.
    #[serde(default = "default_data_url")]
    pub data_url: String,

    /// Delay before the worker is started when no search arrives first.
    #[serde(default = "default_init_delay_ms")]
    pub init_delay_ms: u64,

    /// Maximum number of priority pages per result area.
    #[serde(default = "default_priority_limit")]
    pub priority_limit: usize,

    /// Per-field boost weights.
    #[serde(default)]
    pub boosts: FieldBoosts,
}

/// Boost weights applied to each indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBoosts {
    #[serde(default = "default_topics_boost")]
    pub topics: f64,

    #[serde(default = "default_title_boost")]
    pub title: f64,

    #[serde(default = "default_headings_boost")]
    pub headings: f64,

    #[serde(default = "default_members_boost")]
    pub members: f64,

    #[serde(default = "default_keywords_boost")]
    pub keywords: f64,
}

/// Development server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as static files.
    #[serde(default = "default_root")]
    pub root: String,
}

// Default value functions
fn default_data_url() -> String {
    "/generated/docs/app/search-data.json".to_string()
}

fn default_init_delay_ms() -> u64 {
    2000
}

fn default_priority_limit() -> usize {
    5
}

fn default_topics_boost() -> f64 {
    15.0
}

fn default_title_boost() -> f64 {
    10.0
}

fn default_headings_boost() -> f64 {
    5.0
}

fn default_members_boost() -> f64 {
    4.0
}

fn default_keywords_boost() -> f64 {
    2.0
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_root() -> String {
    ".".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            data_url: default_data_url(),
            init_delay_ms: default_init_delay_ms(),
            priority_limit: default_priority_limit(),
            boosts: FieldBoosts::default(),
        }
    }
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            topics: default_topics_boost(),
            title: default_title_boost(),
            headings: default_headings_boost(),
            members: default_members_boost(),
            keywords: default_keywords_boost(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: default_root(),
        }
    }
}

impl SearchConfig {
    /// Worker start-up delay as a `Duration`.
    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }
}

impl FieldBoosts {
    fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("topics", self.topics),
            ("title", self.title),
            ("headings", self.headings),
            ("members", self.members),
            ("keywords", self.keywords),
        ]
        .into_iter()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file with `DOCSEARCH__*` environment
    /// overrides, e.g. `DOCSEARCH__SEARCH__INIT_DELAY_MS=0`.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("DOCSEARCH").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.search.data_url.trim().is_empty() {
            return Err(CoreError::config("search.data_url cannot be empty"));
        }

        if self.search.priority_limit == 0 {
            return Err(CoreError::config(
                "search.priority_limit must be at least 1",
            ));
        }

        for (field, boost) in self.search.boosts.iter() {
            if !boost.is_finite() || boost < 0.0 {
                return Err(CoreError::config(format!(
                    "search.boosts.{field} must be a non-negative number"
                )));
            }
        }

        if self.search.data_url.starts_with("http://") {
            tracing::warn!(url = %self.search.data_url, "corpus is fetched over plain HTTP");
        }

        Ok(())
    }

    /// Address the development server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
