//! Domain layer for the plasmid browser.
//!
//! Holds the record model, the worksheet classifier and the error taxonomy,
//! independent of transport and presentation concerns.
//!
//! # Organization
//!
//! - [`classify`]: Worksheet exclusion and tiered-level predicates
//! - [`error`]: Error types and result aliases
//! - [`record`]: Row, Member, Link and Dataset types

pub mod classify;
pub mod error;
pub mod record;

pub use error::{BrowserError, LoadError, Result};
pub use record::{Dataset, Link, Member, Row, UpdatedAt};
