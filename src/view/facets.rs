//! Facet engine: cascading option sets for the filter dimensions.
//!
//! Member and Group options depend only on the loaded data. Worksheet options
//! are narrowed by the current Member and Group selections; nothing depends on
//! the Worksheet selection, so the cascade has no cycle.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::filters::{GroupFilter, MemberFilter, WorksheetFilter};
use crate::domain::classify::{is_excluded_worksheet, is_other_group};
use crate::domain::{Member, Row};

/// A selectable value with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption<T> {
    pub value: T,
    pub label: String,
}

impl<T> FacetOption<T> {
    fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Numeric-aware ordering that ignores case and accents.
///
/// Both sides are folded to base letters first (`"É"` and `"e"` compare
/// equal), then digit runs compare by value (`"sheet 2" < "sheet 10"`) and
/// other characters compare as folded. Strings equal under that rule are
/// ordered by plain byte comparison so the ordering stays total.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_folded(&fold(a), &fold(b)).then_with(|| a.cmp(b))
}

/// Lower-cases and strips combining marks after canonical decomposition.
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let lhs = take_digits(&mut left);
                let rhs = take_digits(&mut right);
                let ordering = compare_digit_runs(&lhs, &rhs);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Member options: synthetic "all" first, then members by natural label order.
///
/// Members with neither id nor name are skipped; duplicate keys keep the
/// first occurrence.
#[must_use]
pub fn member_options(members: &[Member]) -> Vec<FacetOption<MemberFilter>> {
    let mut seen = BTreeSet::new();
    let mut options: Vec<FacetOption<MemberFilter>> = members
        .iter()
        .filter(|member| !member.key().is_empty())
        .filter(|member| seen.insert(member.key().to_string()))
        .map(|member| FacetOption::new(MemberFilter::Member(member.key().to_string()), member.label()))
        .collect();

    options.sort_by(|a, b| natural_cmp(&a.label, &b.label));
    options.insert(0, FacetOption::new(MemberFilter::All, "all"));
    options
}

/// Group options: `all`, plus `Other` when any row is in the Other group.
#[must_use]
pub fn group_options(rows: &[Row]) -> Vec<FacetOption<GroupFilter>> {
    let mut options = vec![FacetOption::new(GroupFilter::All, GroupFilter::All.label())];
    if rows.iter().any(|row| row.is_other_group) {
        options.push(FacetOption::new(GroupFilter::Other, GroupFilter::Other.label()));
    }
    options
}

/// Worksheet options under the current Member and Group selections.
///
/// Worksheets listed on matching members seed the set; worksheets of the
/// narrowed rows are merged in. Empty and aggregate names never appear.
#[must_use]
pub fn worksheet_options(
    rows: &[Row],
    members: &[Member],
    member: &MemberFilter,
    group: GroupFilter,
) -> Vec<FacetOption<WorksheetFilter>> {
    let seeded = members
        .iter()
        .filter(|m| match member {
            MemberFilter::All => true,
            MemberFilter::Member(key) => m.member_id == *key || m.name == *key,
        })
        .flat_map(|m| m.worksheets.iter())
        .filter(|sheet| group == GroupFilter::All || is_other_group(sheet));

    let from_rows = rows
        .iter()
        .filter(|row| member.matches(row) && group.matches(row))
        .map(|row| &row.worksheet);

    let mut sheets: Vec<&String> = seeded
        .chain(from_rows)
        .filter(|sheet| !sheet.is_empty() && !is_excluded_worksheet(sheet))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    sheets.sort_by(|a, b| natural_cmp(a, b));

    std::iter::once(FacetOption::new(WorksheetFilter::All, "all"))
        .chain(
            sheets
                .into_iter()
                .map(|sheet| FacetOption::new(WorksheetFilter::Sheet(sheet.clone()), sheet.as_str())),
        )
        .collect()
}

/// All three facets, computed together for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    pub members: Vec<FacetOption<MemberFilter>>,
    pub groups: Vec<FacetOption<GroupFilter>>,
    pub worksheets: Vec<FacetOption<WorksheetFilter>>,
}

impl Facets {
    #[must_use]
    pub fn compute(rows: &[Row], members: &[Member], member: &MemberFilter, group: GroupFilter) -> Self {
        let _span = tracing::debug_span!("compute_facets", rows = rows.len(), members = members.len()).entered();
        Self {
            members: member_options(members),
            groups: group_options(rows),
            worksheets: worksheet_options(rows, members, member, group),
        }
    }

    #[must_use]
    pub fn offers_worksheet(&self, worksheet: &WorksheetFilter) -> bool {
        self.worksheets.iter().any(|option| option.value == *worksheet)
    }
}

impl Default for Facets {
    fn default() -> Self {
        Self::compute(&[], &[], &MemberFilter::All, GroupFilter::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(member: &str, sheet: &str) -> Row {
        Row {
            member_id: member.to_string(),
            worksheet: sheet.to_string(),
            is_other_group: is_other_group(sheet),
            ..Row::default()
        }
    }

    fn member(id: &str, name: &str, sheets: &[&str]) -> Member {
        Member {
            member_id: id.to_string(),
            name: name.to_string(),
            worksheets: sheets.iter().map(ToString::to_string).collect(),
        }
    }

    fn sheet_labels(options: &[FacetOption<WorksheetFilter>]) -> Vec<&str> {
        options.iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn natural_order_is_numeric_aware_and_case_insensitive() {
        let mut names = vec!["sheet 10", "Sheet 2", "sheet 1", "alpha", "Beta", "sheet 02b"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["alpha", "Beta", "sheet 1", "Sheet 2", "sheet 02b", "sheet 10"]);
    }

    #[test]
    fn natural_order_ignores_accents() {
        let mut names = vec!["eb", "éa", "Èc"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["éa", "eb", "Èc"]);
        assert_eq!(natural_cmp("Level é2", "level E10"), Ordering::Less);
        assert_ne!(natural_cmp("é", "e"), Ordering::Equal);
    }

    #[test]
    fn natural_order_is_total_on_case_variants() {
        assert_eq!(natural_cmp("abc", "ABC"), "abc".cmp("ABC"));
        assert_eq!(natural_cmp("x", "x"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
    }

    #[test]
    fn member_options_start_with_all_and_sort_by_label() {
        let options = member_options(&[
            member("M10", "Zed", &[]),
            member("M2", "Amy", &[]),
            member("", "Bo", &[]),
            member("", "", &[]),
            member("M2", "Dup", &[]),
        ]);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["all", "Bo", "M2 · Amy", "M10 · Zed"]);
        assert_eq!(options[0].value, MemberFilter::All);
        assert_eq!(options[1].value, MemberFilter::Member("Bo".to_string()));
    }

    #[test]
    fn group_options_offer_other_only_when_present() {
        assert_eq!(group_options(&[row("M1", "Level 1")]).len(), 1);
        let groups = group_options(&[row("M1", "Level 1"), row("M1", "MiscTab")]);
        let values: Vec<GroupFilter> = groups.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![GroupFilter::All, GroupFilter::Other]);
    }

    #[test]
    fn worksheet_options_cascade_from_member_and_group() {
        let rows = vec![
            row("M1", "Level 1"),
            row("M1", "MiscTab"),
            row("M2", "Level 3 spare"),
            row("M2", "Level 2"),
            row("M2", ""),
        ];

        let all = worksheet_options(&rows, &[], &MemberFilter::All, GroupFilter::All);
        assert_eq!(sheet_labels(&all), vec!["all", "Level 1", "Level 2", "Level 3 spare", "MiscTab"]);

        let m1 = worksheet_options(&rows, &[], &MemberFilter::Member("M1".to_string()), GroupFilter::All);
        assert_eq!(sheet_labels(&m1), vec!["all", "Level 1", "MiscTab"]);

        let other = worksheet_options(&rows, &[], &MemberFilter::All, GroupFilter::Other);
        assert_eq!(sheet_labels(&other), vec!["all", "Level 3 spare", "MiscTab"]);
    }

    #[test]
    fn member_worksheets_seed_options() {
        let members = vec![
            member("M1", "Ada", &["Level 0", "Scratch", "all_plasmids"]),
            member("M2", "Lin", &["Level 2"]),
        ];
        let rows = vec![row("M1", "Level 1")];

        let m1 = worksheet_options(&rows, &members, &MemberFilter::Member("M1".to_string()), GroupFilter::All);
        assert_eq!(sheet_labels(&m1), vec!["all", "Level 0", "Level 1", "Scratch"]);

        let m1_other = worksheet_options(&rows, &members, &MemberFilter::Member("M1".to_string()), GroupFilter::Other);
        assert_eq!(sheet_labels(&m1_other), vec!["all", "Scratch"]);
    }

    #[test]
    fn facets_report_offered_worksheets() {
        let rows = vec![row("M1", "Level 1")];
        let facets = Facets::compute(&rows, &[], &MemberFilter::All, GroupFilter::All);
        assert!(facets.offers_worksheet(&WorksheetFilter::All));
        assert!(facets.offers_worksheet(&WorksheetFilter::Sheet("Level 1".to_string())));
        assert!(!facets.offers_worksheet(&WorksheetFilter::Sheet("Level 2".to_string())));
    }
}
