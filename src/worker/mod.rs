//! Background loading on tokio tasks.
//!
//! - `messages`: Request/response types with trace context propagation
//! - `handler`: The [`LoadWorker`] that runs loads and posts settlements

pub mod handler;
pub mod messages;

pub use handler::LoadWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
