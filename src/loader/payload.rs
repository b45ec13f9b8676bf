//! Wire document for the load endpoint.
//!
//! The endpoint answers `{ members, rows, updatedAt, error?, reason? }`, either
//! bare (primary fetch) or wrapped as `<callback>(<json>)` (script fallback).
//! Every field is optional and loosely typed; coercion to canonical types is
//! done by [`super::normalize`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::LoadError;

/// The load response document, with values kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default)]
    pub rows: Option<Vec<Value>>,
    #[serde(default)]
    pub members: Option<Vec<Value>>,
    #[serde(default)]
    pub updated_at: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub reason: Option<Value>,
}

impl Payload {
    /// Returns the remote error, if the document signals one.
    ///
    /// A missing, `null`, `false` or empty `error` is not an error.
    #[must_use]
    pub fn remote_error(&self) -> Option<LoadError> {
        let error = self.error.as_ref().and_then(truthy_text)?;
        Some(LoadError::Remote {
            error,
            reason: self.reason.as_ref().and_then(truthy_text),
        })
    }

    /// Raw row objects; non-object entries are skipped.
    pub fn row_objects(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.rows.iter().flatten().filter_map(Value::as_object)
    }

    /// Raw member objects; non-object entries are skipped.
    pub fn member_objects(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.members.iter().flatten().filter_map(Value::as_object)
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a bare JSON payload.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the text is not JSON or the top level is
/// not an object with the expected field types.
pub fn parse(body: &str) -> Result<Payload, LoadError> {
    serde_json::from_str(body).map_err(|e| LoadError::Parse(format!("invalid payload: {e}")))
}

/// Extracts the JSON argument from a `<callback>(<json>)` script body.
///
/// Leading whitespace and comment guards such as `/**/`, and a trailing `;`,
/// are tolerated. The callback name must match exactly.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the body does not invoke `callback`.
pub fn unwrap_callback<'a>(body: &'a str, callback: &str) -> Result<&'a str, LoadError> {
    let mut rest = body.trim_start();
    while let Some(after) = rest.strip_prefix("/**/") {
        rest = after.trim_start();
    }

    let invocation = rest
        .strip_prefix(callback)
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix('('))
        .ok_or_else(|| LoadError::Parse(format!("script body does not invoke {callback}")))?;

    let trimmed = invocation.trim_end();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    trimmed
        .strip_suffix(')')
        .ok_or_else(|| LoadError::Parse(format!("unterminated call to {callback}")))
}
