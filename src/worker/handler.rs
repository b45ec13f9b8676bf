//! Async load worker.
//!
//! Each `Load` request runs on its own tokio task; settlements are posted back
//! over an unbounded channel tagged with their epoch. The worker never decides
//! whether a settlement is stale, it only delivers it.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::loader::Loader;
use crate::worker::{TraceContext, WorkerMessage, WorkerResponse};

/// Runs loads in the background and reports their outcomes.
pub struct LoadWorker {
    loader: Arc<Loader>,
    responses: UnboundedSender<WorkerResponse>,
    in_flight: Vec<JoinHandle<()>>,
}

impl LoadWorker {
    /// Creates a worker and the receiving end of its response channel.
    #[must_use]
    pub fn new(loader: Arc<Loader>) -> (Self, UnboundedReceiver<WorkerResponse>) {
        let (responses, receiver) = mpsc::unbounded_channel();
        let worker = Self {
            loader,
            responses,
            in_flight: vec![],
        };
        (worker, receiver)
    }

    #[must_use]
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Number of load tasks that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|task| !task.is_finished()).count()
    }

    /// Processes one message.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle_message(&mut self, message: WorkerMessage) {
        let _span = tracing::debug_span!("worker_handle_message", message_type = message.kind()).entered();
        self.in_flight.retain(|task| !task.is_finished());

        match message {
            WorkerMessage::Load {
                epoch,
                token,
                trace_context,
            } => self.spawn_load(epoch, token, trace_context.as_ref()),
            WorkerMessage::Shutdown => self.shutdown(),
        }
    }

    fn spawn_load(&mut self, epoch: u64, token: String, trace_context: Option<&TraceContext>) {
        let span = tracing::info_span!("load_epoch", epoch);
        if let Some(parent) = trace_context.and_then(TraceContext::to_otel_context) {
            use tracing_opentelemetry::OpenTelemetrySpanExt;
            span.set_parent(parent);
        }

        let loader = Arc::clone(&self.loader);
        let responses = self.responses.clone();

        let task = tokio::spawn(
            async move {
                let outcome = loader.load(&token).await;
                if let Err(e) = &outcome {
                    tracing::debug!(error = %e, "load settled with failure");
                }
                if responses.send(WorkerResponse::from_outcome(epoch, outcome)).is_err() {
                    tracing::debug!("response receiver dropped, settlement discarded");
                }
            }
            .instrument(span),
        );

        tracing::debug!(epoch, in_flight = self.in_flight.len() + 1, "load task spawned");
        self.in_flight.push(task);
    }

    fn shutdown(&mut self) {
        for task in self.in_flight.drain(..) {
            task.abort();
        }
        let revoked = self.loader.teardown();
        tracing::info!(revoked_callbacks = revoked, "load worker shut down");
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        if !self.in_flight.is_empty() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for LoadWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadWorker")
            .field("loader", &self.loader)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
