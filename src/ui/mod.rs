//! Renderer boundary.
//!
//! The crate does not draw anything. It computes a [`UIViewModel`] from the
//! session and any front end (terminal, web, native) renders it:
//!
//! ```text
//! ViewSession → compute_viewmodel → UIViewModel → renderer
//! ```

pub mod viewmodel;

pub use viewmodel::{
    ColumnHeader, DisplayRow, EmptyState, FilterBar, FooterInfo, HeaderInfo, OptionItem, StatusInfo,
    UIViewModel,
};
