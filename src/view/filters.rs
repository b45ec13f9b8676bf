//! View state and the categorical filter types.
//!
//! Filter dimensions are sum types rather than sentinel strings, so "all" can
//! never collide with a real member or worksheet called `all`.

use std::fmt;
use std::str::FromStr;

use crate::domain::Row;
use crate::loader::normalize::keys;

/// Member filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MemberFilter {
    #[default]
    All,
    /// Matches rows whose member id or member name equals the key.
    Member(String),
}

impl MemberFilter {
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::All => true,
            Self::Member(key) => row.is_owned_by(key),
        }
    }
}

/// Group filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroupFilter {
    #[default]
    All,
    /// Only worksheets outside the level 0/1/2 convention.
    Other,
}

impl GroupFilter {
    #[must_use]
    pub const fn matches(self, row: &Row) -> bool {
        match self {
            Self::All => true,
            Self::Other => row.is_other_group,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Other => "Other",
        }
    }
}

/// Worksheet filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum WorksheetFilter {
    #[default]
    All,
    /// Exact worksheet name.
    Sheet(String),
}

impl WorksheetFilter {
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::All => true,
            Self::Sheet(name) => row.worksheet == *name,
        }
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Name,
    Info,
    Antibiotics,
    Description,
    Location,
    Link,
}

impl SortKey {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Info,
        Self::Antibiotics,
        Self::Description,
        Self::Location,
        Self::Link,
    ];

    /// Wire column key.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => keys::NAME,
            Self::Info => keys::INFO,
            Self::Antibiotics => keys::ANTIBIOTICS,
            Self::Description => keys::DESCRIPTION,
            Self::Location => keys::LOCATION,
            Self::Link => keys::LINK,
        }
    }

    /// Column header label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Plasmid",
            Self::Info => "Info",
            Self::Antibiotics => "Abx",
            Self::Description => "Description",
            Self::Location => "Box",
            Self::Link => "Benchling",
        }
    }

    /// The row's value for this column.
    #[must_use]
    pub fn value(self, row: &Row) -> &str {
        match self {
            Self::Name => &row.name,
            Self::Info => &row.info,
            Self::Antibiotics => &row.antibiotics,
            Self::Description => &row.description,
            Self::Location => &row.location,
            Self::Link => row.link.search_text(),
        }
    }

    fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.column() == column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Sort selection: a column and a direction.
///
/// Round-trips through the `"<column>:<asc|desc>"` form used by sort pickers;
/// a missing direction means ascending.
///
/// ```
/// use plasmid_browser::view::{SortDir, SortKey, SortSpec};
///
/// let spec: SortSpec = "Box_(Location):desc".parse().unwrap();
/// assert_eq!(spec, SortSpec { key: SortKey::Location, dir: SortDir::Desc });
/// assert_eq!(spec.to_string(), "Box_(Location):desc");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub dir: SortDir,
}

impl SortSpec {
    #[must_use]
    pub const fn new(key: SortKey, dir: SortDir) -> Self {
        Self { key, dir }
    }

    /// Every selectable spec, ascending and descending per column.
    #[must_use]
    pub fn options() -> Vec<Self> {
        SortKey::ALL
            .into_iter()
            .flat_map(|key| [Self::new(key, SortDir::Asc), Self::new(key, SortDir::Desc)])
            .collect()
    }

    /// Picker label, e.g. `Box (desc)`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{} ({})", self.key.label(), self.dir.as_str())
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key.column(), self.dir.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, dir) = s.rsplit_once(':').unwrap_or((s, "asc"));
        let key = SortKey::from_column(column).ok_or_else(|| format!("unknown sort column: {column}"))?;
        let dir = match dir {
            "" | "asc" => SortDir::Asc,
            "desc" => SortDir::Desc,
            other => return Err(format!("unknown sort direction: {other}")),
        };
        Ok(Self { key, dir })
    }
}

/// User-controlled view state.
///
/// Mutated only through [`ViewSession`](crate::app::ViewSession), which
/// enforces the reset and clamping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub member: MemberFilter,
    pub group: GroupFilter,
    pub worksheet: WorksheetFilter,
    pub sort: SortSpec,
    /// 1-based page index.
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            member: MemberFilter::All,
            group: GroupFilter::All,
            worksheet: WorksheetFilter::All,
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_round_trips_every_option() {
        for spec in SortSpec::options() {
            assert_eq!(spec.to_string().parse::<SortSpec>(), Ok(spec));
        }
        assert_eq!(SortSpec::options().len(), 12);
    }

    #[test]
    fn sort_spec_defaults_direction() {
        assert_eq!(
            "Antibiotics".parse::<SortSpec>(),
            Ok(SortSpec::new(SortKey::Antibiotics, SortDir::Asc))
        );
        assert!("Nope:asc".parse::<SortSpec>().is_err());
        assert!("Plasmid_Name:sideways".parse::<SortSpec>().is_err());
    }

    #[test]
    fn default_view_is_name_ascending_page_one() {
        let view = ViewState::default();
        assert_eq!(view.sort, SortSpec::new(SortKey::Name, SortDir::Asc));
        assert_eq!(view.page, 1);
        assert_eq!(view.member, MemberFilter::All);
        assert_eq!(view.worksheet, WorksheetFilter::All);
    }

    #[test]
    fn filters_match_rows() {
        let row = Row {
            member_id: "M1".to_string(),
            worksheet: "MiscTab".to_string(),
            is_other_group: true,
            ..Row::default()
        };
        assert!(MemberFilter::Member("M1".to_string()).matches(&row));
        assert!(!MemberFilter::Member("M2".to_string()).matches(&row));
        assert!(GroupFilter::Other.matches(&row));
        assert!(WorksheetFilter::Sheet("MiscTab".to_string()).matches(&row));
        assert!(!WorksheetFilter::Sheet("misctab".to_string()).matches(&row));
    }

    #[test]
    fn sort_labels() {
        assert_eq!(SortSpec::new(SortKey::Location, SortDir::Desc).label(), "Box (desc)");
    }
}
