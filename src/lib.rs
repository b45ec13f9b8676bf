//! Plasmid Browser: a searchable, filterable, paginated view over a
//! token-gated lab inventory.
//!
//! The crate is the data view engine behind an inventory table. It loads the
//! inventory for a bearer token (direct fetch, then a callback-wrapped script
//! fallback), normalizes and classifies the records, computes cascading facet
//! options, evaluates AND-search plus categorical filters with a stable sort,
//! and paginates the result. Rendering is left to the caller, which receives
//! a display-ready [`UIViewModel`](ui::UIViewModel).

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling, ViewSession, Runtime             │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ View (view/)  │   │ Loader        │   │ Worker        │
//! │ - Facets      │   │ (loader/)     │   │ (worker/)     │
//! │ - Query       │   │ - Transports  │   │ - tokio tasks │
//! │ - Paginate    │   │ - Normalize   │   │ - Epoch tags  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/): records, classifier, errors      │
//! │  Infrastructure (infrastructure/): paths            │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/): span file export   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: View session, events, actions and the async runtime
//! - [`domain`]: Records, classifier and error types
//! - [`loader`]: Token-gated loading with script fallback and normalization
//! - [`view`]: Facet engine, query engine and paginator
//! - [`worker`]: Background load tasks
//! - [`ui`]: View model handed to renderers
//! - [`infrastructure`]: Filesystem locations
//! - [`observability`]: Tracing setup
//!
//! # Configuration
//!
//! From the environment:
//!
//! ```text
//! PLASMID_DATA_URL=https://script.example/exec
//! PLASMID_PAGE_SIZE=50
//! PLASMID_LOAD_TIMEOUT_SECS=30
//! PLASMID_TRACE_LEVEL=debug
//! PLASMID_TRACE_FILE=~/traces/plasmid.json
//! ```
//!
//! or from a TOML file with the same keys in lower case without the prefix.
//!
//! # Example
//!
//! ```no_run
//! use plasmid_browser::{Config, Event, Runtime};
//!
//! # async fn run() -> plasmid_browser::Result<()> {
//! let config = Config::from_env();
//! plasmid_browser::observability::init_tracing(&config);
//!
//! let mut runtime = Runtime::from_config(&config)?;
//! runtime.dispatch(&Event::TokenChanged(Some("id-token".to_string())))?;
//! runtime.settle().await?;
//! runtime.dispatch(&Event::QueryChanged("kan box".to_string()))?;
//!
//! let view = runtime.viewmodel();
//! println!("{}", view.status.text);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod loader;
pub mod observability;
pub mod ui;
pub mod view;
pub mod worker;

pub use app::{handle_event, Action, Event, Runtime, ViewSession};
pub use domain::{BrowserError, Dataset, LoadError, Result, Row};

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Number of rows per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Per-attempt transport timeout unless configured otherwise.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base endpoint of the inventory service. The token is appended as a
    /// query parameter.
    pub data_url: String,

    /// Rows per page. Zero is treated as one. Default: 50
    pub page_size: usize,

    /// Timeout applied to each transport attempt, in seconds. Default: 30
    pub load_timeout_secs: u64,

    /// Tracing filter directive, e.g. `debug` or `plasmid_browser=trace`.
    /// Default: `"info"`
    pub trace_level: Option<String>,

    /// Span export file. Default: `<data dir>/plasmid-browser-otlp.json`
    pub trace_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Builds a configuration from `PLASMID_*` key/value pairs.
    ///
    /// Unknown keys are ignored; unparsable numbers keep their defaults.
    ///
    /// ```
    /// use plasmid_browser::Config;
    ///
    /// let config = Config::from_vars([
    ///     ("PLASMID_DATA_URL", "https://data.example/exec"),
    ///     ("PLASMID_PAGE_SIZE", "25"),
    ///     ("PLASMID_LOAD_TIMEOUT_SECS", "soon"),
    /// ]);
    /// assert_eq!(config.page_size, 25);
    /// assert_eq!(config.load_timeout_secs, 30);
    /// ```
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "PLASMID_DATA_URL" => config.data_url = value.to_string(),
                "PLASMID_PAGE_SIZE" => {
                    if let Ok(size) = value.parse() {
                        config.page_size = size;
                    }
                }
                "PLASMID_LOAD_TIMEOUT_SECS" => {
                    if let Ok(secs) = value.parse() {
                        config.load_timeout_secs = secs;
                    }
                }
                "PLASMID_TRACE_LEVEL" => config.trace_level = Some(value.to_string()).filter(|v| !v.is_empty()),
                "PLASMID_TRACE_FILE" => config.trace_file = Some(value.to_string()).filter(|v| !v.is_empty()),
                _ => {}
            }
        }
        config
    }

    /// Reads `PLASMID_*` variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Config`] when the document is malformed.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| BrowserError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Io`] when the file cannot be read and
    /// [`BrowserError::Config`] when it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Creates an empty session sized from configuration.
///
/// The session waits for a token; feed it events through [`handle_event`]
/// or drive it with a [`Runtime`].
#[must_use]
pub fn initialize(config: &Config) -> ViewSession {
    tracing::debug!(page_size = config.page_size, "initializing view session");
    ViewSession::new(config.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert!(config.data_url.is_empty());
    }

    #[test]
    fn vars_override_defaults() {
        let config = Config::from_vars([
            ("PLASMID_DATA_URL", " https://data.example/exec "),
            ("PLASMID_PAGE_SIZE", "abc"),
            ("PLASMID_LOAD_TIMEOUT_SECS", "5"),
            ("PLASMID_TRACE_LEVEL", "debug"),
            ("PLASMID_TRACE_FILE", ""),
            ("HOME", "/home/ada"),
        ]);
        assert_eq!(config.data_url, "https://data.example/exec");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.load_timeout_secs, 5);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.trace_file, None);
    }

    #[test]
    fn toml_with_partial_keys() {
        let config = Config::from_toml_str("data_url = \"https://data.example/exec\"\npage_size = 20\n").unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.load_timeout_secs, 30);
        assert!(matches!(Config::from_toml_str("page_size = \"many\""), Err(BrowserError::Config(_))));
    }

    #[test]
    fn config_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "load_timeout_secs = 12\ntrace_level = \"warn\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.load_timeout_secs, 12);
        assert_eq!(config.trace_level.as_deref(), Some("warn"));

        let missing = Config::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(BrowserError::Io(_))));
    }

    #[test]
    fn initialize_uses_page_size() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert_eq!(initialize(&config).page_size(), 1);
    }
}
