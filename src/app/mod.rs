//! Application layer: session state, events, actions and the async runtime.
//!
//! ```text
//! Token / user input → Event → handle_event → ViewSession → Actions
//!                        ↑                                      ↓
//!                        └──────── WorkerResponse ◄── LoadWorker
//! ```
//!
//! - [`state`]: The [`ViewSession`] and its view model computation
//! - [`handler`]: Event processing and state transitions
//! - [`actions`]: Side effects emitted by the handler
//! - [`runtime`]: Executes actions and feeds worker settlements back

pub mod actions;
pub mod handler;
pub mod runtime;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use runtime::Runtime;
pub use state::{LoadRequest, ViewSession};
