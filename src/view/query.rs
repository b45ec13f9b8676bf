//! Query engine: composite filter plus stable sort.
//!
//! Free text is split on whitespace into lower-cased needles; a row matches
//! when every needle is a substring of its searchable text (AND semantics, no
//! OR, no fuzzy matching). Categorical filters must all hold as well. Results
//! are sorted by the selected column, case-insensitively, with ties kept in
//! input order.

use super::filters::{SortDir, SortSpec, ViewState};
use crate::domain::Row;

/// Splits a query into lower-cased, non-empty needles.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Lower-cased concatenation of every searchable field, space separated.
///
/// Empty fields are skipped so they cannot create spurious double spaces.
#[must_use]
pub fn haystack(row: &Row) -> String {
    [
        row.name.as_str(),
        row.info.as_str(),
        row.antibiotics.as_str(),
        row.description.as_str(),
        row.location.as_str(),
        row.link.search_text(),
        row.member_id.as_str(),
        row.member_name.as_str(),
        row.worksheet.as_str(),
    ]
    .into_iter()
    .filter(|field| !field.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Whether every needle occurs in the row's searchable text.
#[must_use]
pub fn matches_needles(row: &Row, needles: &[String]) -> bool {
    if needles.is_empty() {
        return true;
    }
    let hay = haystack(row);
    needles.iter().all(|needle| hay.contains(needle.as_str()))
}

/// Whether `row` passes the categorical filters of `view`.
#[must_use]
pub fn matches_filters(row: &Row, view: &ViewState) -> bool {
    view.member.matches(row) && view.group.matches(row) && view.worksheet.matches(row)
}

/// Sorts rows in place by `sort`; equal keys keep their relative order.
pub fn sort_rows(rows: &mut Vec<&Row>, sort: SortSpec) {
    let mut keyed: Vec<(String, &Row)> = rows
        .drain(..)
        .map(|row| (sort.key.value(row).to_lowercase(), row))
        .collect();

    // `sort_by` is stable; the comparator only ever looks at the key.
    match sort.dir {
        SortDir::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDir::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    rows.extend(keyed.into_iter().map(|(_, row)| row));
}

/// Evaluates `view` against `rows`, returning the ordered matches.
#[must_use]
pub fn evaluate<'a>(rows: &'a [Row], view: &ViewState) -> Vec<&'a Row> {
    let needles = tokenize(&view.query);
    let _span = tracing::debug_span!(
        "evaluate_query",
        total_rows = rows.len(),
        needles = needles.len(),
        sort = %view.sort
    )
    .entered();

    let mut matched: Vec<&Row> = rows
        .iter()
        .filter(|row| matches_filters(row, view) && matches_needles(row, &needles))
        .collect();
    sort_rows(&mut matched, view.sort);

    tracing::debug!(matched = matched.len(), "query evaluated");
    matched
}
