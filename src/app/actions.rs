//! Side effects requested by the event handler.
//!
//! The handler itself never performs I/O; it returns a `Vec<Action>` that the
//! [`Runtime`](crate::app::Runtime) executes in order.

use crate::worker::WorkerMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hands a message to the background load worker.
    PostToWorker(WorkerMessage),
}
