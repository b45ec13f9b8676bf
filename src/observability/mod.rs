//! Tracing with span export to a local JSON-lines file.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK provider → JsonLinesExporter → rotating file
//! ```
//!
//! Filter precedence: `RUST_LOG`, then `trace_level` from [`Config`](crate::Config),
//! then `info`. The trace file rotates at 10 MB and keeps 3 numbered backups.
//!
//! ```no_run
//! use plasmid_browser::observability::init_tracing;
//! use plasmid_browser::Config;
//!
//! init_tracing(&Config::default());
//! tracing::info!("tracing is active");
//! ```

mod exporter;
mod init;
mod rotating;

pub use init::init_tracing;
