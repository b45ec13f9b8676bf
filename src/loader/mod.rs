//! Data loader: token-gated fetch with script fallback.
//!
//! # Pipeline
//!
//! ```text
//! token ─► load_target ─► primary GET ──ok──► parse ─┐
//!                              │ fail                │
//!                              ▼                     ▼
//!                        script fallback ──► remote error check ─► normalize ─► Dataset
//! ```
//!
//! Every transport attempt is bounded by the configured timeout. Any primary
//! failure (transport, status, unparsable body, timeout) falls through to the
//! fallback unconditionally; a fallback failure is terminal for the epoch and
//! is never retried here.
//!
//! # Modules
//!
//! - [`request`]: Target URL construction
//! - [`transport`]: The [`Transport`] seam and the `reqwest` implementation
//! - [`script`]: Callback-wrapped fallback and its callback registry
//! - [`payload`]: Wire document parsing
//! - [`normalize`]: Record normalizer

pub mod normalize;
pub mod payload;
pub mod request;
pub mod script;
pub mod transport;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use script::{CallbackRegistry, ScriptFallback};
pub use transport::{HttpTransport, Transport, TransportFailure};

use crate::domain::{BrowserError, Dataset, LoadError, Result};
use crate::Config;
use payload::Payload;

/// Loads and normalizes the inventory for a bearer token.
pub struct Loader {
    base_url: String,
    timeout: Duration,
    primary: Arc<dyn Transport>,
    fallback: ScriptFallback,
}

impl Loader {
    /// Creates a loader over explicit transports.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        primary: Arc<dyn Transport>,
        script: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            primary,
            fallback: ScriptFallback::new(script, CallbackRegistry::new()),
        }
    }

    /// Creates a loader from configuration, using `reqwest` for both
    /// transports.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Config`] when `data_url` is empty or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.data_url.trim().is_empty() {
            return Err(BrowserError::Config("data_url is not set".to_string()));
        }

        let timeout = config.load_timeout();
        let http = HttpTransport::new(timeout).map_err(|e| BrowserError::Config(e.to_string()))?;
        let http: Arc<dyn Transport> = Arc::new(http);

        Ok(Self::new(config.data_url.trim(), timeout, Arc::clone(&http), http))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn callbacks(&self) -> &CallbackRegistry {
        self.fallback.registry()
    }

    /// Revokes every outstanding script callback.
    ///
    /// In-flight requests keep running but their responses are rejected.
    pub fn teardown(&self) -> usize {
        let revoked = self.fallback.registry().clear();
        if revoked > 0 {
            tracing::debug!(revoked, "revoked outstanding script callbacks");
        }
        revoked
    }

    /// Runs the load pipeline for `token`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Transport`] when both transports fail.
    /// - [`LoadError::Parse`] when the fallback body is malformed.
    /// - [`LoadError::Remote`] when the payload carries an `error` field.
    pub async fn load(&self, token: &str) -> std::result::Result<Dataset, LoadError> {
        let target = request::load_target(&self.base_url, token);

        let payload = match self.fetch_primary(&target).await {
            Ok(payload) => payload,
            Err(primary_err) => {
                tracing::warn!(error = %primary_err, "primary fetch failed, trying script fallback");
                self.fetch_fallback(&target)
                    .await
                    .map_err(|fallback_err| combine(&primary_err, fallback_err))?
            }
        };

        if let Some(remote) = payload.remote_error() {
            tracing::debug!(error = %remote, "payload signalled a remote error");
            return Err(remote);
        }

        Ok(normalize::normalize_payload(&payload))
    }

    async fn fetch_primary(&self, target: &str) -> std::result::Result<Payload, LoadError> {
        let body = bounded(self.timeout, self.primary.get(target))
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        payload::parse(&body)
    }

    async fn fetch_fallback(&self, target: &str) -> std::result::Result<Payload, LoadError> {
        match tokio::time::timeout(self.timeout, self.fallback.fetch(target)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Transport(format!(
                "script load error: {}",
                TransportFailure::TimedOut(self.timeout)
            ))),
        }
    }
}

async fn bounded<F>(timeout: Duration, attempt: F) -> std::result::Result<String, TransportFailure>
where
    F: Future<Output = std::result::Result<String, TransportFailure>>,
{
    tokio::time::timeout(timeout, attempt)
        .await
        .unwrap_or(Err(TransportFailure::TimedOut(timeout)))
}

/// Folds the primary failure into the terminal fallback failure.
fn combine(primary: &LoadError, fallback: LoadError) -> LoadError {
    match fallback {
        LoadError::Transport(message) => LoadError::Transport(format!("{primary}; {message}")),
        other => other,
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport returning a canned response and recording requested URLs.
    struct Canned {
        reply: std::result::Result<&'static str, TransportFailure>,
        wrap_callback: bool,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl Canned {
        fn ok(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body),
                wrap_callback: false,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(vec![]),
            })
        }

        fn script(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body),
                wrap_callback: true,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(vec![]),
            })
        }

        fn failing(failure: TransportFailure) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(failure),
                wrap_callback: false,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(vec![]),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn get(&self, url: &str) -> std::result::Result<String, TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            let body = self.reply.clone()?;
            if self.wrap_callback {
                let (_, callback) = url.rsplit_once("callback=").unwrap();
                Ok(format!("{callback}({body})"))
            } else {
                Ok(body.to_string())
            }
        }
    }

    struct Hanging;

    #[async_trait]
    impl Transport for Hanging {
        async fn get(&self, _url: &str) -> std::result::Result<String, TransportFailure> {
            std::future::pending().await
        }
    }

    const BODY: &str = r#"{
        "members":[{"memberId":"M1","name":"Ada"}],
        "rows":[
            {"Plasmid_Name":"pA","worksheet":"Level 1","memberId":"M1"},
            {"Plasmid_Name":"pB","worksheet":"all_plasmids","memberId":"M1"}
        ],
        "updatedAt":"2024-05-01T12:30:00Z"
    }"#;

    fn loader(primary: Arc<dyn Transport>, script: Arc<dyn Transport>) -> Loader {
        Loader::new("https://data.test/exec", Duration::from_secs(5), primary, script)
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = Canned::ok(BODY);
        let script = Canned::script(BODY);
        let loader = loader(primary.clone(), script.clone());

        let dataset = loader.load("tok en").await.unwrap();
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(dataset.members.len(), 1);
        assert!(dataset.updated_at.is_some());
        assert_eq!(script.calls(), 0);
        assert_eq!(
            primary.urls.lock().unwrap().as_slice(),
            ["https://data.test/exec?idToken=tok+en".to_string()]
        );
    }

    #[tokio::test]
    async fn non_success_status_falls_back() {
        let primary = Canned::failing(TransportFailure::Status(500));
        let script = Canned::script(BODY);
        let loader = loader(primary, script.clone());

        let dataset = loader.load("tok").await.unwrap();
        assert_eq!(dataset.rows[0].name, "pA");
        assert_eq!(script.calls(), 1);
        let url = script.urls.lock().unwrap()[0].clone();
        assert!(url.starts_with("https://data.test/exec?idToken=tok&callback=__jsonp_"));
        assert!(loader.callbacks().is_empty());
    }

    #[tokio::test]
    async fn unparsable_primary_body_falls_back() {
        let loader = loader(Canned::ok("<html>login</html>"), Canned::script(BODY));
        assert!(loader.load("tok").await.is_ok());
    }

    #[tokio::test]
    async fn both_transports_failing_is_transport_error() {
        let loader = loader(
            Canned::failing(TransportFailure::Network("refused".to_string())),
            Canned::failing(TransportFailure::Status(404)),
        );

        let err = loader.load("tok").await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Transport(
                "network error: refused; script load error: HTTP 404".to_string()
            )
        );
        assert!(loader.callbacks().is_empty());
    }

    #[tokio::test]
    async fn remote_error_fails_even_on_http_success() {
        let loader = loader(
            Canned::ok(r#"{"error":"unauthorized","reason":"not on allowlist"}"#),
            Canned::script(BODY),
        );

        let err = loader.load("tok").await.unwrap_err();
        assert_eq!(err.to_string(), "unauthorized: not on allowlist");
    }

    #[tokio::test]
    async fn malformed_fallback_is_parse_error() {
        let loader = loader(
            Canned::failing(TransportFailure::Status(502)),
            Canned::script("{broken"),
        );
        assert!(matches!(loader.load("tok").await, Err(LoadError::Parse(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_transports_time_out() {
        let loader = Loader::new(
            "https://data.test/exec",
            Duration::from_secs(30),
            Arc::new(Hanging),
            Arc::new(Hanging),
        );

        let err = loader.load("tok").await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Transport(
                "timed out after 30s; script load error: timed out after 30s".to_string()
            )
        );
        assert!(loader.callbacks().is_empty());
    }

    #[test]
    fn from_config_requires_data_url() {
        let config = Config::default();
        assert!(matches!(Loader::from_config(&config), Err(BrowserError::Config(_))));

        let config = Config {
            data_url: "https://data.test/exec".to_string(),
            ..Config::default()
        };
        let loader = Loader::from_config(&config).unwrap();
        assert_eq!(loader.base_url(), "https://data.test/exec");
    }
}
