//! Record normalizer.
//!
//! Maps loosely typed wire objects onto [`Row`] and [`Member`]. Coercion is
//! best-effort: strings pass through, numbers and booleans are stringified,
//! anything else becomes the empty string. Rows from the aggregate worksheet
//! are dropped here and never reach the view layer.

use serde_json::{Map, Value};

use super::payload::Payload;
use crate::domain::classify::{is_excluded_worksheet, is_other_group};
use crate::domain::{Dataset, Link, Member, Row, UpdatedAt};

/// Wire keys of the record columns.
pub mod keys {
    pub const NAME: &str = "Plasmid_Name";
    pub const INFO: &str = "Plasmid_Information";
    pub const ANTIBIOTICS: &str = "Antibiotics";
    pub const DESCRIPTION: &str = "Descriptions";
    pub const LOCATION: &str = "Box_(Location)";
    pub const LINK: &str = "Benchling";
    pub const MEMBER_ID: &str = "memberId";
    pub const MEMBER_NAME: &str = "memberName";
    pub const WORKSHEET: &str = "worksheet";
    pub const NAME_FIELD: &str = "name";
    pub const WORKSHEETS: &str = "worksheets";
}

/// Coerces a JSON value to display text.
#[must_use]
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn field(raw: &Map<String, Value>, key: &str) -> String {
    coerce_text(raw.get(key))
}

/// Normalizes the link column.
///
/// Empty strings, `null`, and objects with neither a `url` nor a `text`
/// normalize to [`Link::None`].
#[must_use]
pub fn normalize_link(value: Option<&Value>) -> Link {
    match value {
        Some(Value::String(url)) if !url.is_empty() => Link::Url(url.clone()),
        Some(Value::Object(obj)) => {
            let url = coerce_text(obj.get("url"));
            let text = coerce_text(obj.get("text"));
            if url.is_empty() && text.is_empty() {
                Link::None
            } else {
                Link::Described { url, text }
            }
        }
        _ => Link::None,
    }
}

/// Normalizes one raw row, or returns `None` when its worksheet is excluded.
#[must_use]
pub fn normalize_row(raw: &Map<String, Value>, position: usize) -> Option<Row> {
    let worksheet = field(raw, keys::WORKSHEET);
    if is_excluded_worksheet(&worksheet) {
        tracing::trace!(position, worksheet = %worksheet, "dropping aggregate worksheet row");
        return None;
    }

    Some(Row {
        position,
        name: field(raw, keys::NAME),
        info: field(raw, keys::INFO),
        antibiotics: field(raw, keys::ANTIBIOTICS),
        description: field(raw, keys::DESCRIPTION),
        location: field(raw, keys::LOCATION),
        link: normalize_link(raw.get(keys::LINK)),
        member_id: field(raw, keys::MEMBER_ID),
        member_name: field(raw, keys::MEMBER_NAME),
        is_other_group: is_other_group(&worksheet),
        worksheet,
    })
}

/// Normalizes one raw member.
#[must_use]
pub fn normalize_member(raw: &Map<String, Value>) -> Member {
    let worksheets = raw
        .get(keys::WORKSHEETS)
        .and_then(Value::as_array)
        .map(|sheets| {
            sheets
                .iter()
                .map(|sheet| coerce_text(Some(sheet)))
                .filter(|sheet| !sheet.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Member {
        member_id: field(raw, keys::MEMBER_ID),
        name: field(raw, keys::NAME_FIELD),
        worksheets,
    }
}

/// Normalizes the `updatedAt` field; falsy values become `None`.
#[must_use]
pub fn normalize_updated_at(value: Option<&Value>) -> Option<UpdatedAt> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(UpdatedAt::Text(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .filter(|millis| *millis != 0)
            .map(UpdatedAt::EpochMillis),
        _ => None,
    }
}

/// Normalizes a whole payload into a [`Dataset`].
///
/// Row positions are assigned after exclusion, so they are dense indices into
/// the resulting row set.
#[must_use]
pub fn normalize_payload(payload: &Payload) -> Dataset {
    let _span = tracing::debug_span!("normalize_payload").entered();

    let mut dropped = 0usize;
    let rows: Vec<Row> = payload
        .row_objects()
        .filter_map(|raw| {
            let row = normalize_row(raw, 0);
            if row.is_none() {
                dropped += 1;
            }
            row
        })
        .enumerate()
        .map(|(position, row)| Row { position, ..row })
        .collect();

    let members: Vec<Member> = payload.member_objects().map(normalize_member).collect();

    tracing::debug!(
        rows = rows.len(),
        dropped_rows = dropped,
        members = members.len(),
        "payload normalized"
    );

    Dataset {
        rows,
        members,
        updated_at: normalize_updated_at(payload.updated_at.as_ref()),
    }
}
