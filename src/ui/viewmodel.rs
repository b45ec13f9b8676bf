//! Display-ready snapshot of a [`ViewSession`](crate::app::ViewSession).
//!
//! View models are created by `ViewSession::compute_viewmodel()` and handed to
//! whatever renders the table. They carry no behaviour, only text and flags.

/// Complete snapshot for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UIViewModel {
    pub header: HeaderInfo,

    /// Result count or loading indicator, plus the last load error.
    pub status: StatusInfo,

    /// Current query and selectable options for each picker.
    pub filters: FilterBar,

    /// Table columns in display order.
    pub columns: Vec<ColumnHeader>,

    /// Rows on the current page.
    pub display_rows: Vec<DisplayRow>,

    pub footer: FooterInfo,

    /// Present when the page is empty and nothing is loading.
    pub empty_state: Option<EmptyState>,

    /// No token has been supplied yet; show the sign-in prompt.
    pub sign_in_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,

    /// `Updated: <timestamp>` when the payload carried one.
    pub updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// `Loading…` or `N result(s)`.
    pub text: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBar {
    pub query: String,
    pub members: Vec<OptionItem>,
    pub groups: Vec<OptionItem>,
    pub worksheets: Vec<OptionItem>,
    pub sorts: Vec<OptionItem>,
}

/// One entry of a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    /// Wire column key, usable with `SortKey` parsing.
    pub key: String,

    /// Label with a `▲`/`▼` suffix on the active sort column.
    pub label: String,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Cell text in column order. The link cell reads `link here` or
    /// `no data`.
    pub cells: Vec<String>,

    /// Target of the link cell.
    pub link_url: Option<String>,

    /// `<owner> · <worksheet>`.
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    /// `Page x / y`, with ` · Showing a–b` when there are results.
    pub page_text: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
}
