//! Pure view pipeline over a loaded [`Dataset`](crate::domain::Dataset).
//!
//! ```text
//! rows ─► facets (member, group ─► worksheet)
//!   └──► query (filter + stable sort) ─► paginate ─► visible page
//! ```
//!
//! Every function here is synchronous, side-effect free and total.

pub mod facets;
pub mod filters;
pub mod paginate;
pub mod query;

pub use facets::{natural_cmp, FacetOption, Facets};
pub use filters::{GroupFilter, MemberFilter, SortDir, SortKey, SortSpec, ViewState, WorksheetFilter};
pub use paginate::{paginate, Page};
pub use query::evaluate;
