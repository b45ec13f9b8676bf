//! Drives a [`ViewSession`] against a live [`LoadWorker`].
//!
//! The runtime is the only place where actions become effects. Worker
//! settlements are fed back through [`handle_event`] like any other event, so
//! the session stays single-threaded.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{handle_event, Action, Event, ViewSession};
use crate::domain::{BrowserError, Result};
use crate::loader::Loader;
use crate::ui::viewmodel::UIViewModel;
use crate::worker::{LoadWorker, WorkerResponse};
use crate::Config;

pub struct Runtime {
    session: ViewSession,
    worker: LoadWorker,
    responses: UnboundedReceiver<WorkerResponse>,
}

impl Runtime {
    /// Builds a runtime with `reqwest` transports from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Config`] when no loader can be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let loader = Loader::from_config(config)?;
        Ok(Self::new(loader, config.page_size))
    }

    #[must_use]
    pub fn new(loader: Loader, page_size: usize) -> Self {
        let (worker, responses) = LoadWorker::new(Arc::new(loader));
        Self {
            session: ViewSession::new(page_size),
            worker,
            responses,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &ViewSession {
        &self.session
    }

    #[must_use]
    pub const fn worker(&self) -> &LoadWorker {
        &self.worker
    }

    #[must_use]
    pub fn viewmodel(&self) -> UIViewModel {
        self.session.compute_viewmodel()
    }

    /// Handles one event and executes the resulting actions.
    ///
    /// Returns whether the view changed. Must be called within a tokio
    /// runtime because loads are spawned as tasks.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub fn dispatch(&mut self, event: &Event) -> Result<bool> {
        let (changed, actions) = handle_event(&mut self.session, event)?;
        for action in actions {
            self.execute(action);
        }
        Ok(changed)
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::PostToWorker(message) => self.worker.handle_message(message),
        }
    }

    /// Waits for the next worker settlement and applies it.
    ///
    /// Returns whether the view changed; stale settlements report `false`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Worker`] when the worker channel has closed.
    pub async fn next_settlement(&mut self) -> Result<bool> {
        let response = self
            .responses
            .recv()
            .await
            .ok_or_else(|| BrowserError::Worker("load worker channel closed".to_string()))?;
        self.dispatch(&Event::WorkerResponse(response))
    }

    /// Applies settlements until the current epoch has settled.
    ///
    /// Settlements of superseded epochs arriving first are discarded along
    /// the way.
    ///
    /// # Errors
    ///
    /// See [`Runtime::next_settlement`].
    pub async fn settle(&mut self) -> Result<()> {
        while self.session.is_loading() {
            self.next_settlement().await?;
        }
        Ok(())
    }

    /// Revokes outstanding callbacks and stops in-flight loads.
    pub fn shutdown(mut self) {
        if let Err(e) = self.dispatch(&Event::Teardown) {
            tracing::debug!(error = %e, "teardown dispatch failed");
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("session", &self.session)
            .field("worker", &self.worker)
            .finish_non_exhaustive()
    }
}
