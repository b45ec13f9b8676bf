//! Request and response types exchanged with the load worker.
//!
//! Requests capture the caller's OpenTelemetry span so the spawned load task
//! is linked to the event that started it.

use crate::domain::{Dataset, LoadError};

/// Trace and span ids of the span active when a message was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking the worker span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the context of the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the span
    /// is not sampled.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Rebuilds a remote parent context from the captured ids.
    #[must_use]
    pub fn to_otel_context(&self) -> Option<opentelemetry::Context> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;
        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());

        Some(opentelemetry::Context::current().with_remote_span_context(span_context))
    }
}

/// Messages sent to the load worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Load the inventory for `token` under `epoch`.
    Load {
        epoch: u64,
        token: String,
        trace_context: Option<TraceContext>,
    },

    /// Revoke outstanding script callbacks and stop in-flight loads.
    Shutdown,
}

impl WorkerMessage {
    /// Creates a `Load` message carrying the current trace context.
    #[must_use]
    pub fn load(epoch: u64, token: impl Into<String>) -> Self {
        Self::Load {
            epoch,
            token: token.into(),
            trace_context: TraceContext::from_current(),
        }
    }

    /// Variant name for span fields; never includes the token.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "Load",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// Responses posted back by the load worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResponse {
    Loaded { epoch: u64, dataset: Dataset },
    Failed { epoch: u64, error: LoadError },
}

impl WorkerResponse {
    #[must_use]
    pub fn from_outcome(epoch: u64, outcome: Result<Dataset, LoadError>) -> Self {
        match outcome {
            Ok(dataset) => Self::Loaded { epoch, dataset },
            Err(error) => Self::Failed { epoch, error },
        }
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        match self {
            Self::Loaded { epoch, .. } | Self::Failed { epoch, .. } => *epoch,
        }
    }

    /// Splits the response into its epoch and load outcome.
    #[must_use]
    pub fn into_outcome(self) -> (u64, Result<Dataset, LoadError>) {
        match self {
            Self::Loaded { epoch, dataset } => (epoch, Ok(dataset)),
            Self::Failed { epoch, error } => (epoch, Err(error)),
        }
    }
}
