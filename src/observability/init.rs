//! Subscriber setup.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::exporter;
use crate::infrastructure::paths;
use crate::Config;

const SERVICE_NAME: &str = "plasmid-browser";
const DEFAULT_TRACE_FILE: &str = "plasmid-browser-otlp.json";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs the global tracing subscriber with span export to a file.
///
/// The filter comes from `RUST_LOG` when set, else `config.trace_level`,
/// else `info`. Spans go to `config.trace_file`, or
/// `<data dir>/plasmid-browser-otlp.json` by default.
///
/// Only the first call has any effect. Returns whether this crate's
/// subscriber is the active one; `false` when the trace directory cannot be
/// created or another subscriber was installed first.
pub fn init_tracing(config: &Config) -> bool {
    *INSTALLED.get_or_init(|| install(config))
}

fn install(config: &Config) -> bool {
    let trace_file = config
        .trace_file
        .as_deref()
        .map_or_else(|| paths::data_dir().join(DEFAULT_TRACE_FILE), paths::expand_tilde);

    if let Some(dir) = trace_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if std::fs::create_dir_all(dir).is_err() {
            return false;
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(config.trace_level.as_deref().unwrap_or("info"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let resource = Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", SERVICE_NAME),
        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = exporter::tracer_provider(trace_file, resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init()
        .is_ok()
}
