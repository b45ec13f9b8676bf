//! View session: the single owner of loaded data and view state.
//!
//! [`ViewSession`] wires loader output into the facet engine, query engine and
//! paginator, and re-derives results whenever an input changes. It is mutated
//! only by the event handler, synchronously, so every derived value is computed
//! against one consistent snapshot.
//!
//! # Reset policy
//!
//! - Member or Group change: worksheet back to "all", page back to 1.
//! - Query change: page back to 1, worksheet untouched.
//! - Any refresh: a worksheet no longer offered by the facets falls back to
//!   "all", and the page is clamped into `1..=page_count`.
//!
//! # Epochs
//!
//! Every load is tagged with the epoch current when it started. A new token,
//! a cleared token or a manual reload bumps the epoch, so settlements of
//! superseded loads are recognised and dropped.

use crate::domain::{Dataset, LoadError, Row};
use crate::ui::viewmodel::{
    ColumnHeader, DisplayRow, EmptyState, FilterBar, FooterInfo, HeaderInfo, OptionItem, StatusInfo, UIViewModel,
};
use crate::view::facets::Facets;
use crate::view::filters::{
    GroupFilter, MemberFilter, SortDir, SortKey, SortSpec, ViewState, WorksheetFilter,
};
use crate::view::paginate::{clamp_page, page_count, paginate, Page};
use crate::view::query::evaluate;

/// A load the session wants started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub epoch: u64,
    pub token: String,
}

/// Central session state.
#[derive(Debug, Clone)]
pub struct ViewSession {
    /// Last-known-good data; replaced wholesale on every successful load.
    pub dataset: Dataset,
    pub view: ViewState,
    pub facets: Facets,
    /// Indices into `dataset.rows`, in result order.
    results: Vec<usize>,
    page_size: usize,
    token: Option<String>,
    epoch: u64,
    loading: bool,
    error: Option<String>,
}

impl ViewSession {
    /// Creates an empty session waiting for a token.
    ///
    /// A `page_size` of zero is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            dataset: Dataset::default(),
            view: ViewState::default(),
            facets: Facets::default(),
            results: vec![],
            page_size: page_size.max(1),
            token: None,
            epoch: 0,
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Message of the last failed load, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of rows matching the current view.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Every matching row, in result order.
    pub fn results(&self) -> impl Iterator<Item = &Row> + '_ {
        self.results.iter().filter_map(|&index| self.dataset.rows.get(index))
    }

    /// The current page of result indices.
    #[must_use]
    pub fn page(&self) -> Page<'_, usize> {
        paginate(&self.results, self.page_size, self.view.page)
    }

    /// Rows on the current page.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.page()
            .visible
            .iter()
            .filter_map(|&index| self.dataset.rows.get(index))
            .collect()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.results.len(), self.page_size)
    }

    /// Accepts a token from the identity boundary.
    ///
    /// Returns the load to start, if any. Re-delivering the token already in
    /// use starts nothing. Clearing the token supersedes any in-flight load
    /// but keeps the last-known-good data.
    pub fn set_token(&mut self, token: Option<String>) -> Option<LoadRequest> {
        let token = token.filter(|t| !t.is_empty());
        if token == self.token {
            tracing::debug!(epoch = self.epoch, "token unchanged, keeping current epoch");
            return None;
        }

        self.token = token;
        if self.token.is_none() {
            self.epoch += 1;
            self.loading = false;
            tracing::debug!(epoch = self.epoch, "token cleared");
            return None;
        }

        self.begin_epoch()
    }

    /// Starts a fresh epoch for the current token.
    pub fn reload(&mut self) -> Option<LoadRequest> {
        if self.token.is_none() {
            tracing::debug!("reload requested without a token");
            return None;
        }
        self.begin_epoch()
    }

    /// Supersedes any in-flight load because the worker is going away.
    ///
    /// Returns `true` when a load was in flight. Loaded data stays in place;
    /// a later [`reload`](Self::reload) starts a fresh epoch.
    pub fn teardown(&mut self) -> bool {
        self.epoch += 1;
        let was_loading = std::mem::replace(&mut self.loading, false);
        tracing::debug!(epoch = self.epoch, was_loading, "session torn down");
        was_loading
    }

    fn begin_epoch(&mut self) -> Option<LoadRequest> {
        let token = self.token.clone()?;
        self.epoch += 1;
        self.loading = true;
        tracing::debug!(epoch = self.epoch, "load epoch started");
        Some(LoadRequest {
            epoch: self.epoch,
            token,
        })
    }

    /// Applies the settlement of the load started at `epoch`.
    ///
    /// Returns `false` when the epoch is stale and nothing changed. On
    /// failure the previous data and view state stay in place and only the
    /// error message is updated.
    pub fn apply_load(&mut self, epoch: u64, outcome: Result<Dataset, LoadError>) -> bool {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "discarding stale load settlement");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(mut dataset) => {
                for (index, row) in dataset.rows.iter_mut().enumerate() {
                    row.position = index;
                }
                tracing::info!(
                    epoch,
                    rows = dataset.rows.len(),
                    members = dataset.members.len(),
                    "dataset loaded"
                );
                self.dataset = dataset;
                self.error = None;
                self.refresh();
            }
            Err(e) => {
                tracing::error!(epoch, error = %e, "load failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Returns `true` when the query actually changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.view.query {
            return false;
        }
        self.view.query = query;
        self.view.page = 1;
        self.refresh();
        true
    }

    pub fn set_member(&mut self, member: MemberFilter) -> bool {
        if member == self.view.member {
            return false;
        }
        self.view.member = member;
        self.reset_scope();
        true
    }

    pub fn set_group(&mut self, group: GroupFilter) -> bool {
        if group == self.view.group {
            return false;
        }
        self.view.group = group;
        self.reset_scope();
        true
    }

    fn reset_scope(&mut self) {
        self.view.worksheet = WorksheetFilter::All;
        self.view.page = 1;
        self.refresh();
    }

    /// Selects a worksheet; selections the facets do not offer are rejected.
    pub fn set_worksheet(&mut self, worksheet: WorksheetFilter) -> bool {
        if worksheet == self.view.worksheet {
            return false;
        }
        if !self.facets.offers_worksheet(&worksheet) {
            tracing::debug!(?worksheet, "worksheet not offered under current scope");
            return false;
        }
        self.view.worksheet = worksheet;
        self.view.page = 1;
        self.refresh();
        true
    }

    pub fn set_sort(&mut self, sort: SortSpec) -> bool {
        if sort == self.view.sort {
            return false;
        }
        self.view.sort = sort;
        self.refresh();
        true
    }

    /// Flips direction when `key` is already active, else sorts by `key`
    /// ascending.
    pub fn toggle_sort(&mut self, key: SortKey) -> bool {
        let sort = if self.view.sort.key == key {
            SortSpec::new(key, self.view.sort.dir.flipped())
        } else {
            SortSpec::new(key, SortDir::Asc)
        };
        self.set_sort(sort)
    }

    /// Moves to `page`, clamped. Returns `true` when the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = clamp_page(page, self.page_count());
        if page == self.view.page {
            return false;
        }
        self.view.page = page;
        true
    }

    pub fn first_page(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.view.page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.view.page + 1)
    }

    pub fn last_page(&mut self) -> bool {
        self.set_page(self.page_count())
    }

    /// Re-derives facets and results from the current data and view state.
    pub fn refresh(&mut self) {
        let _span = tracing::debug_span!(
            "refresh_session",
            rows = self.dataset.rows.len(),
            page = self.view.page
        )
        .entered();

        self.facets = Facets::compute(
            &self.dataset.rows,
            &self.dataset.members,
            &self.view.member,
            self.view.group,
        );
        if !self.facets.offers_worksheet(&self.view.worksheet) {
            tracing::debug!(worksheet = ?self.view.worksheet, "stale worksheet selection reset");
            self.view.worksheet = WorksheetFilter::All;
        }

        self.results = evaluate(&self.dataset.rows, &self.view)
            .into_iter()
            .map(|row| row.position)
            .collect();
        self.view.page = clamp_page(self.view.page, self.page_count());
    }

    /// Computes a renderable snapshot of the session.
    ///
    /// The page shown is the clamped current page; the empty state appears
    /// only when the page is empty and no load is in flight.
    #[must_use]
    pub fn compute_viewmodel(&self) -> UIViewModel {
        let page = self.page();
        let total = page.total;

        let status = StatusInfo {
            text: if self.loading {
                "Loading…".to_string()
            } else {
                format!("{total} result{}", if total == 1 { "" } else { "s" })
            },
            error: self.error.clone(),
        };

        let mut page_text = format!("Page {} / {}", page.clamped_page, page.page_count);
        if let Some((first, last)) = page.showing() {
            page_text.push_str(&format!(" · Showing {first}–{last}"));
        }

        let display_rows: Vec<DisplayRow> = page
            .visible
            .iter()
            .filter_map(|&index| self.dataset.rows.get(index))
            .map(display_row)
            .collect();

        let empty_state = (display_rows.is_empty() && !self.loading).then(|| EmptyState {
            message: "No matches. Try a different keyword or filter.".to_string(),
        });

        UIViewModel {
            header: HeaderInfo {
                title: "Plasmid Browser".to_string(),
                updated: self
                    .dataset
                    .updated_at
                    .as_ref()
                    .map(|at| format!("Updated: {}", at.display())),
            },
            status,
            filters: self.compute_filter_bar(),
            columns: self.compute_columns(),
            display_rows,
            footer: FooterInfo {
                page_text,
                can_go_back: !page.is_first(),
                can_go_forward: !page.is_last(),
            },
            empty_state,
            sign_in_required: self.token.is_none(),
        }
    }

    fn compute_filter_bar(&self) -> FilterBar {
        let members = self
            .facets
            .members
            .iter()
            .map(|option| OptionItem {
                value: match &option.value {
                    MemberFilter::All => "all".to_string(),
                    MemberFilter::Member(key) => key.clone(),
                },
                label: option.label.clone(),
                selected: option.value == self.view.member,
            })
            .collect();

        let groups = self
            .facets
            .groups
            .iter()
            .map(|option| OptionItem {
                value: option.value.label().to_string(),
                label: option.label.clone(),
                selected: option.value == self.view.group,
            })
            .collect();

        let worksheets = self
            .facets
            .worksheets
            .iter()
            .map(|option| OptionItem {
                value: match &option.value {
                    WorksheetFilter::All => "all".to_string(),
                    WorksheetFilter::Sheet(name) => name.clone(),
                },
                label: option.label.clone(),
                selected: option.value == self.view.worksheet,
            })
            .collect();

        let sorts = SortSpec::options()
            .into_iter()
            .map(|spec| OptionItem {
                value: spec.to_string(),
                label: spec.label(),
                selected: spec == self.view.sort,
            })
            .collect();

        FilterBar {
            query: self.view.query.clone(),
            members,
            groups,
            worksheets,
            sorts,
        }
    }

    fn compute_columns(&self) -> Vec<ColumnHeader> {
        SortKey::ALL
            .into_iter()
            .map(|key| {
                let indicator = match self.view.sort {
                    SortSpec { key: active, dir: SortDir::Asc } if active == key => " ▲",
                    SortSpec { key: active, dir: SortDir::Desc } if active == key => " ▼",
                    _ => "",
                };
                ColumnHeader {
                    key: key.column().to_string(),
                    label: format!("{}{indicator}", key.label()),
                }
            })
            .collect()
    }
}

fn display_row(row: &Row) -> DisplayRow {
    let cells = SortKey::ALL
        .into_iter()
        .map(|key| match key {
            SortKey::Link => {
                let text = if row.link.url().is_some() { "link here" } else { "no data" };
                text.to_string()
            }
            other => other.value(row).to_string(),
        })
        .collect();

    DisplayRow {
        cells,
        link_url: row.link.url().map(str::to_string),
        owner: format!("{} · {}", row.owner(), row.worksheet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify::is_other_group;
    use crate::domain::Member;

    fn row(name: &str, member: &str, sheet: &str) -> Row {
        Row {
            name: name.to_string(),
            member_id: member.to_string(),
            worksheet: sheet.to_string(),
            is_other_group: is_other_group(sheet),
            ..Row::default()
        }
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset {
            rows,
            members: vec![
                Member {
                    member_id: "M1".to_string(),
                    name: "Ada".to_string(),
                    worksheets: vec![],
                },
                Member {
                    member_id: "M2".to_string(),
                    name: "Lin".to_string(),
                    worksheets: vec![],
                },
            ],
            updated_at: None,
        }
    }

    fn loaded(rows: Vec<Row>, page_size: usize) -> ViewSession {
        let mut session = ViewSession::new(page_size);
        let request = session.set_token(Some("tok".to_string())).unwrap();
        assert!(session.apply_load(request.epoch, Ok(dataset(rows))));
        session
    }

    fn many(count: usize) -> Vec<Row> {
        (0..count).map(|i| row(&format!("p{i:03}"), "M1", "Level 1")).collect()
    }

    fn names(session: &ViewSession) -> Vec<String> {
        session.visible_rows().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn no_token_means_no_load() {
        let mut session = ViewSession::new(50);
        assert_eq!(session.set_token(None), None);
        assert_eq!(session.set_token(Some(String::new())), None);
        assert!(session.reload().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn same_token_does_not_start_a_second_load() {
        let mut session = ViewSession::new(50);
        let first = session.set_token(Some("tok".to_string())).unwrap();
        assert_eq!(first, LoadRequest { epoch: 1, token: "tok".to_string() });
        assert_eq!(session.set_token(Some("tok".to_string())), None);
        assert!(session.is_loading());
    }

    #[test]
    fn teardown_supersedes_the_load_in_flight() {
        let mut session = loaded(many(3), 50);
        let request = session.reload().unwrap();
        assert!(session.is_loading());

        assert!(session.teardown());
        assert!(!session.is_loading());
        assert!(!session.apply_load(request.epoch, Ok(dataset(many(1)))));
        assert_eq!(session.result_count(), 3);
        assert_eq!(session.compute_viewmodel().status.text, "3 results");

        assert!(!session.teardown());
        let again = session.reload().unwrap();
        assert_eq!(again.epoch, session.epoch());
    }

    #[test]
    fn stale_epochs_are_discarded() {
        let mut session = ViewSession::new(50);
        let old = session.set_token(Some("a".to_string())).unwrap();
        let new = session.set_token(Some("b".to_string())).unwrap();

        assert!(!session.apply_load(old.epoch, Ok(dataset(many(3)))));
        assert!(session.dataset.rows.is_empty());
        assert!(session.is_loading());

        assert!(session.apply_load(new.epoch, Ok(dataset(many(2)))));
        assert_eq!(session.result_count(), 2);
        assert!(!session.is_loading());
    }

    #[test]
    fn clearing_the_token_supersedes_the_in_flight_load() {
        let mut session = loaded(many(2), 50);
        let request = session.reload().unwrap();
        assert_eq!(session.set_token(None), None);
        assert!(!session.apply_load(request.epoch, Ok(dataset(many(9)))));
        assert_eq!(session.result_count(), 2);
    }

    #[test]
    fn failure_keeps_last_known_good_data() {
        let mut session = loaded(many(3), 50);
        session.set_query("p001");
        let request = session.reload().unwrap();

        let failed = session.apply_load(request.epoch, Err(LoadError::Transport("HTTP 500".to_string())));
        assert!(failed);
        assert_eq!(session.error(), Some("HTTP 500"));
        assert_eq!(session.dataset.rows.len(), 3);
        assert_eq!(session.view.query, "p001");
        assert_eq!(names(&session), vec!["p001"]);

        let request = session.reload().unwrap();
        session.apply_load(request.epoch, Ok(dataset(many(1))));
        assert_eq!(session.error(), None);
    }

    #[test]
    fn member_change_resets_worksheet_and_page() {
        let mut rows = many(120);
        rows.push(row("misc", "M1", "MiscTab"));
        let mut session = loaded(rows, 50);

        assert!(session.set_worksheet(WorksheetFilter::Sheet("Level 1".to_string())));
        session.set_page(3);
        assert_eq!(session.view.page, 3);

        assert!(session.set_member(MemberFilter::Member("M1".to_string())));
        assert_eq!(session.view.page, 1);
        assert_eq!(session.view.worksheet, WorksheetFilter::All);
    }

    #[test]
    fn group_change_resets_worksheet_and_page() {
        let mut rows = many(60);
        rows.push(row("misc", "M2", "MiscTab"));
        let mut session = loaded(rows, 50);
        session.set_worksheet(WorksheetFilter::Sheet("Level 1".to_string()));
        session.next_page();

        assert!(session.set_group(GroupFilter::Other));
        assert_eq!(session.view.page, 1);
        assert_eq!(session.view.worksheet, WorksheetFilter::All);
        assert_eq!(names(&session), vec!["misc"]);
    }

    #[test]
    fn query_change_resets_page_only() {
        let mut session = loaded(many(120), 50);
        session.set_worksheet(WorksheetFilter::Sheet("Level 1".to_string()));
        session.last_page();
        assert_eq!(session.view.page, 3);

        assert!(session.set_query("p"));
        assert_eq!(session.view.page, 1);
        assert_eq!(session.view.worksheet, WorksheetFilter::Sheet("Level 1".to_string()));
        assert!(!session.set_query("p"));
    }

    #[test]
    fn unoffered_worksheet_is_rejected() {
        let mut session = loaded(many(2), 50);
        assert!(!session.set_worksheet(WorksheetFilter::Sheet("Nope".to_string())));
        assert_eq!(session.view.worksheet, WorksheetFilter::All);
    }

    #[test]
    fn stale_worksheet_resets_after_reload() {
        let mut session = loaded(vec![row("a", "M1", "Scratch"), row("b", "M1", "Level 1")], 50);
        session.set_worksheet(WorksheetFilter::Sheet("Scratch".to_string()));
        assert_eq!(session.result_count(), 1);

        let request = session.reload().unwrap();
        session.apply_load(request.epoch, Ok(dataset(vec![row("b", "M1", "Level 1")])));
        assert_eq!(session.view.worksheet, WorksheetFilter::All);
        assert_eq!(session.result_count(), 1);
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut session = loaded(many(120), 50);
        assert!(!session.prev_page());
        assert!(!session.first_page());
        assert!(session.next_page());
        assert!(session.next_page());
        assert!(!session.next_page());
        assert_eq!(session.view.page, 3);
        assert_eq!(session.visible_rows().len(), 20);
        assert_eq!(session.page().showing(), Some((101, 120)));
        assert!(!session.set_page(99));
        assert!(session.first_page());
    }

    #[test]
    fn shrinking_results_clamp_the_page() {
        let mut session = loaded(many(120), 50);
        session.last_page();
        session.set_sort(SortSpec::new(SortKey::Info, SortDir::Asc));
        assert_eq!(session.view.page, 3);

        let request = session.reload().unwrap();
        session.apply_load(request.epoch, Ok(dataset(many(10))));
        assert_eq!(session.view.page, 1);
    }

    #[test]
    fn toggle_sort_flips_or_selects() {
        let mut session = loaded(vec![row("b", "M1", "L1"), row("a", "M1", "L1")], 50);
        assert_eq!(names(&session), vec!["a", "b"]);

        assert!(session.toggle_sort(SortKey::Name));
        assert_eq!(session.view.sort, SortSpec::new(SortKey::Name, SortDir::Desc));
        assert_eq!(names(&session), vec!["b", "a"]);

        assert!(session.toggle_sort(SortKey::Location));
        assert_eq!(session.view.sort, SortSpec::new(SortKey::Location, SortDir::Asc));
    }

    #[test]
    fn other_group_scenario() {
        let mut session = loaded(vec![row("pA", "M1", "Level 1"), row("pC", "M1", "MiscTab")], 50);
        let groups: Vec<GroupFilter> = session.facets.groups.iter().map(|o| o.value).collect();
        assert_eq!(groups, vec![GroupFilter::All, GroupFilter::Other]);

        session.set_group(GroupFilter::Other);
        assert_eq!(names(&session), vec!["pC"]);
    }

    #[test]
    fn viewmodel_before_sign_in() {
        let vm = ViewSession::new(50).compute_viewmodel();
        assert!(vm.sign_in_required);
        assert_eq!(vm.status.text, "0 results");
        assert_eq!(vm.footer.page_text, "Page 1 / 1");
        assert!(!vm.footer.can_go_back && !vm.footer.can_go_forward);
        assert_eq!(
            vm.empty_state.map(|e| e.message).as_deref(),
            Some("No matches. Try a different keyword or filter.")
        );
    }

    #[test]
    fn viewmodel_while_loading_has_no_empty_state() {
        let mut session = ViewSession::new(50);
        session.set_token(Some("tok".to_string()));
        let vm = session.compute_viewmodel();
        assert_eq!(vm.status.text, "Loading…");
        assert!(vm.empty_state.is_none());
        assert!(!vm.sign_in_required);
    }

    #[test]
    fn viewmodel_describes_the_current_page() {
        let mut rows = many(120);
        rows[119].link = crate::domain::Link::Url("https://bench.example/p119".to_string());
        let mut session = loaded(rows, 50);
        session.last_page();

        let vm = session.compute_viewmodel();
        assert_eq!(vm.status.text, "120 results");
        assert_eq!(vm.footer.page_text, "Page 3 / 3 · Showing 101–120");
        assert!(vm.footer.can_go_back);
        assert!(!vm.footer.can_go_forward);
        assert_eq!(vm.display_rows.len(), 20);
        assert_eq!(vm.columns[0].label, "Plasmid ▲");
        assert_eq!(vm.columns[4].label, "Box");

        let last = vm.display_rows.last().unwrap();
        assert_eq!(last.cells[0], "p119");
        assert_eq!(last.cells[5], "link here");
        assert_eq!(last.link_url.as_deref(), Some("https://bench.example/p119"));
        assert_eq!(last.owner, "M1 · Level 1");
        assert_eq!(vm.display_rows[0].cells[5], "no data");

        let selected: Vec<&str> = vm
            .filters
            .members
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["all"]);
        assert_eq!(vm.filters.sorts.len(), 12);
    }

    #[test]
    fn viewmodel_shows_single_result_and_error() {
        let mut session = loaded(many(1), 50);
        let request = session.reload().unwrap();
        session.apply_load(
            request.epoch,
            Err(LoadError::Remote {
                error: "unauthorized".to_string(),
                reason: Some("not on allowlist".to_string()),
            }),
        );
        let vm = session.compute_viewmodel();
        assert_eq!(vm.status.text, "1 result");
        assert_eq!(vm.status.error.as_deref(), Some("unauthorized: not on allowlist"));
    }
}
