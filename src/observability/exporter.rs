//! Span exporter writing one JSON object per finished span.
//!
//! Each line looks like:
//!
//! ```json
//! {"service":"plasmid-browser","traceId":"…","spanId":"…","parentSpanId":null,
//!  "name":"load_epoch","start":"2024-05-01T12:30:00.000000Z","durationMicros":1834,
//!  "attributes":{"epoch":3},"events":[],"status":"unset"}
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Map, Value as JsonValue};

use super::rotating::RotatingWriter;

pub(super) struct JsonLinesExporter {
    writer: RotatingWriter,
    service: String,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    pub(super) fn new(writer: RotatingWriter, resource: &Resource) -> Self {
        let service = resource
            .get(Key::new("service.name"))
            .map_or_else(|| "unknown".to_string(), |value| value.to_string());
        Self {
            writer,
            service,
            is_shutdown: AtomicBool::new(false),
        }
    }

    fn span_record(&self, span: &SpanData) -> JsonValue {
        let parent = (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id));
        let duration = span.end_time.duration_since(span.start_time).unwrap_or_default();
        let events: Vec<JsonValue> = span
            .events
            .iter()
            .map(|event| {
                json!({
                    "name": event.name,
                    "at": timestamp(event.timestamp),
                    "attributes": attributes(&event.attributes),
                })
            })
            .collect();
        let status = match &span.status {
            Status::Unset => json!("unset"),
            Status::Ok => json!("ok"),
            Status::Error { description } => json!({ "error": description.to_string() }),
        };

        json!({
            "service": self.service,
            "traceId": format!("{:032x}", span.span_context.trace_id()),
            "spanId": format!("{:016x}", span.span_context.span_id()),
            "parentSpanId": parent,
            "name": span.name,
            "start": timestamp(span.start_time),
            "durationMicros": u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            "attributes": attributes(&span.attributes),
            "events": events,
            "status": status,
        })
    }
}

fn timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn attributes(values: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = values
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.to_string()),
        Value::Array(_) => json!(value.to_string()),
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let result = batch
            .iter()
            .try_for_each(|span| self.writer.write_line(&self.span_record(span).to_string()))
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("writer", &self.writer)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Builds a provider that exports every span as it ends.
pub(super) fn tracer_provider(trace_file: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter::new(RotatingWriter::new(trace_file), &resource);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
