//! Script-injection fallback.
//!
//! When the primary fetch fails, the target is requested again as a script
//! resource carrying a `callback=<name>` parameter, and the remote end answers
//! with `<name>(<json>)`. Each call registers a uniquely named callback in a
//! [`CallbackRegistry`] owned by the loader; the returned [`CallbackGuard`]
//! unregisters it when dropped, so cleanup happens on success, on failure,
//! on timeout and when the in-flight future is abandoned.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::payload::{self, Payload};
use super::request::callback_target;
use super::transport::Transport;
use crate::domain::LoadError;

/// Prefix of every generated callback name.
pub const CALLBACK_PREFIX: &str = "__jsonp_";

const CALLBACK_SUFFIX_LEN: usize = 12;

/// Registry of callback names that are currently awaiting a response.
///
/// Cloning shares the registry. Names are unique among live registrations.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set holds plain names; a poisoned lock still has a usable value.
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a fresh, randomly named callback.
    #[must_use]
    pub fn register(&self) -> CallbackGuard {
        let mut rng = rand::thread_rng();
        let mut live = self.lock();
        let name = loop {
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(CALLBACK_SUFFIX_LEN)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            let candidate = format!("{CALLBACK_PREFIX}{suffix}");
            if live.insert(candidate.clone()) {
                break candidate;
            }
        };
        drop(live);

        tracing::trace!(callback = %name, "callback registered");
        CallbackGuard {
            name,
            registry: self.clone(),
        }
    }

    /// Whether `name` is currently registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every registration and returns how many were live.
    ///
    /// Used at teardown: in-flight requests cannot be aborted, but their
    /// callbacks stop being recognized.
    pub fn clear(&self) -> usize {
        let mut live = self.lock();
        let count = live.len();
        live.clear();
        count
    }

    fn release(&self, name: &str) {
        self.lock().remove(name);
    }
}

/// Live registration of one callback name.
#[derive(Debug)]
pub struct CallbackGuard {
    name: String,
    registry: CallbackRegistry,
}

impl CallbackGuard {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the registration survived (it is revoked by a teardown).
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.registry.contains(&self.name)
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        self.registry.release(&self.name);
        tracing::trace!(callback = %self.name, "callback released");
    }
}

/// Fallback that loads the target as a callback-wrapped script.
pub struct ScriptFallback {
    transport: Arc<dyn Transport>,
    registry: CallbackRegistry,
}

impl ScriptFallback {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, registry: CallbackRegistry) -> Self {
        Self {
            transport,
            registry,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Requests `target` as a script and decodes the callback's argument.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Transport`] when the script cannot be loaded or the
    ///   registration was revoked by a teardown before the response arrived.
    /// - [`LoadError::Parse`] when the body does not invoke the callback with
    ///   a JSON document.
    pub async fn fetch(&self, target: &str) -> Result<Payload, LoadError> {
        let guard = self.registry.register();
        let url = callback_target(target, guard.name());

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| LoadError::Transport(format!("script load error: {e}")))?;

        if !guard.is_live() {
            return Err(LoadError::Transport(
                "script callback was torn down before it fired".to_string(),
            ));
        }

        let json = payload::unwrap_callback(&body, guard.name())?;
        payload::parse(json)
    }
}

impl std::fmt::Debug for ScriptFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptFallback")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
