//! Inventory record model.
//!
//! These are the canonical shapes produced by the loader's normalizer and
//! consumed by the facet, query and pagination engines. Wire-level coercion
//! lives in [`crate::loader::normalize`]; nothing here can fail.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// External reference attached to a record.
///
/// The remote document sends either nothing, a bare URL string, or an object
/// with `url` and/or `text`. Any other shape normalizes to [`Link::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Link {
    #[default]
    None,
    Url(String),
    Described { url: String, text: String },
}

impl Link {
    /// The navigable URL, if one exists.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Url(url) => Some(url.as_str()),
            Self::Described { url, .. } => Some(url.as_str()).filter(|u| !u.is_empty()),
        }
    }

    /// Text used for searching and sorting: the URL, or the description when
    /// the URL is empty.
    #[must_use]
    pub fn search_text(&self) -> &str {
        match self {
            Self::None => "",
            Self::Url(url) => url,
            Self::Described { url, text } => {
                if url.is_empty() {
                    text
                } else {
                    url
                }
            }
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// One normalized inventory record.
///
/// `position` is the index in the loaded sequence and is the only identity a
/// row has. Rows whose worksheet is the aggregate tab never reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub position: usize,
    pub name: String,
    pub info: String,
    pub antibiotics: String,
    pub description: String,
    pub location: String,
    pub link: Link,
    pub member_id: String,
    pub member_name: String,
    pub worksheet: String,
    /// Derived: the worksheet does not follow the level 0/1/2 convention.
    pub is_other_group: bool,
}

impl Row {
    /// Whether the row is owned by `member`, matched on id or name.
    #[must_use]
    pub fn is_owned_by(&self, member: &str) -> bool {
        self.member_id == member || self.member_name == member
    }

    /// Owner attribution shown next to the row: id when present, else name.
    #[must_use]
    pub fn owner(&self) -> &str {
        if self.member_id.is_empty() {
            &self.member_name
        } else {
            &self.member_id
        }
    }
}

/// A lab member who owns records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: String,
    pub name: String,
    /// Worksheets the member owns, when the remote end lists them.
    pub worksheets: Vec<String>,
}

impl Member {
    /// Stable filter key: the id, or the name when the id is empty.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.member_id.is_empty() {
            &self.name
        } else {
            &self.member_id
        }
    }

    /// Display label: the non-empty parts of id and name joined by `" · "`.
    #[must_use]
    pub fn label(&self) -> String {
        [self.member_id.as_str(), self.name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// Timestamp of the remote dataset's last refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatedAt {
    /// Textual timestamp as sent (usually RFC 3339).
    Text(String),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
}

impl UpdatedAt {
    /// Interprets the timestamp, if it can be read as a point in time.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| text.trim().parse::<i64>().ok().and_then(millis_to_datetime)),
            Self::EpochMillis(millis) => millis_to_datetime(*millis),
        }
    }

    /// Human-readable form; falls back to the raw text when unparsable.
    #[must_use]
    pub fn display(&self) -> String {
        self.to_datetime().map_or_else(
            || match self {
                Self::Text(text) => text.clone(),
                Self::EpochMillis(millis) => millis.to_string(),
            },
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
    }
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// The result of one successful load: replaces the session's data wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub members: Vec<Member>,
    pub updated_at: Option<UpdatedAt>,
}
