//! Error types for the plasmid browser.
//!
//! Two layers of errors exist. [`LoadError`] is the terminal outcome of one
//! load epoch and is small enough to be cloned into worker responses.
//! [`BrowserError`] is the crate-level error for configuration, I/O and
//! runtime wiring, with [`Result`] as its alias. Both use `thiserror`.

use thiserror::Error;

/// Terminal failure of a single load epoch.
///
/// Produced only by the [`Loader`](crate::loader::Loader). The view layer never
/// sees it directly: the session converts it into a display message and keeps
/// its last-known-good rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Both the primary fetch and the script fallback failed.
    ///
    /// Covers network errors, non-success statuses, script load errors and
    /// timed-out attempts. The message names both failures.
    #[error("{0}")]
    Transport(String),

    /// The payload arrived but carried an application-level `error` field.
    ///
    /// Displayed as `error` or `error: reason`.
    #[error("{error}{}", reason_suffix(.reason))]
    Remote {
        /// The remote `error` value.
        error: String,
        /// The optional remote `reason` value.
        reason: Option<String>,
    },

    /// The payload was not well-formed JSON or lacked the expected shape.
    #[error("{0}")]
    Parse(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

/// The main error type for crate operations outside the load pipeline.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Configuration is invalid or missing.
    ///
    /// Raised when a required value such as the data URL is absent or when a
    /// configuration file cannot be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A load epoch failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// The background load worker could not be reached.
    #[error("Worker communication error: {0}")]
    Worker(String),
}

/// A specialized `Result` type for crate operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_display_appends_reason() {
        let err = LoadError::Remote {
            error: "forbidden".to_string(),
            reason: Some("not on allowlist".to_string()),
        };
        assert_eq!(err.to_string(), "forbidden: not on allowlist");
    }

    #[test]
    fn remote_error_display_without_reason() {
        let err = LoadError::Remote {
            error: "forbidden".to_string(),
            reason: None,
        };
        assert_eq!(err.to_string(), "forbidden");

        let empty_reason = LoadError::Remote {
            error: "forbidden".to_string(),
            reason: Some(String::new()),
        };
        assert_eq!(empty_reason.to_string(), "forbidden");
    }

    #[test]
    fn browser_error_wraps_load_error() {
        let err: BrowserError = LoadError::Parse("bad json".to_string()).into();
        assert_eq!(err.to_string(), "Load error: bad json");
    }
}
