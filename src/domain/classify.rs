//! Worksheet classification.
//!
//! Inventory records are grouped by the worksheet (sheet tab) they were read
//! from. Two worksheet names are special:
//!
//! - the "all plasmids" aggregate tab duplicates every other tab and is
//!   excluded from the record set entirely;
//! - tabs following the tiered-level convention (level 0, 1 or 2 under any of
//!   the `level`/`lvl`/`lv`/`l` abbreviations) form the primary groups, and
//!   every other tab belongs to the "Other" group.
//!
//! All functions are total and allocation-light; non-ASCII input is compared
//! after lower-casing and never causes failure.

use std::sync::OnceLock;

use regex::Regex;

/// Normalized forms of the aggregate worksheet name.
const EXCLUDED_NAMES: [&str; 2] = ["allplasmids", "allplasmid"];

/// Returns true when `name` is the reserved aggregate worksheet.
///
/// The name is lower-cased, non-breaking spaces become regular spaces, and
/// every non-alphanumeric ASCII character is stripped before comparison, so
/// `"All_Plasmids"`, `"all plasmids"` and `"ALL-PLASMID"` all match.
///
/// ```
/// use plasmid_browser::domain::classify::is_excluded_worksheet;
///
/// assert!(is_excluded_worksheet("all_plasmids"));
/// assert!(is_excluded_worksheet("All\u{a0}Plasmid"));
/// assert!(!is_excluded_worksheet("Level 1"));
/// ```
#[must_use]
pub fn is_excluded_worksheet(name: &str) -> bool {
    let normalized: String = name
        .to_lowercase()
        .replace('\u{a0}', " ")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    EXCLUDED_NAMES.contains(&normalized.as_str())
}

/// `None` only if the pattern fails to compile, in which case nothing is tiered.
fn tiered_level_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            // Word edges are "not a letter", so digits and punctuation may touch the token.
            Regex::new(r"(?:^|[^a-z])(?:level|lvl|lv|l)[ _-]*[012](?:[^a-z]|$)")
                .map_err(|e| tracing::error!(error = %e, "tiered-level pattern failed to compile"))
                .ok()
        })
        .as_ref()
}

/// Returns true when `name` follows the level 0/1/2 naming convention.
///
/// ```
/// use plasmid_browser::domain::classify::is_tiered_level;
///
/// assert!(is_tiered_level("Level 1"));
/// assert!(is_tiered_level("lvl_2 backbones"));
/// assert!(is_tiered_level("L0"));
/// assert!(!is_tiered_level("Level 3"));
/// assert!(!is_tiered_level("MiscTab"));
/// ```
#[must_use]
pub fn is_tiered_level(name: &str) -> bool {
    tiered_level_pattern().is_some_and(|pattern| pattern.is_match(&name.to_lowercase()))
}

/// Returns true when a worksheet belongs to the "Other" group.
#[must_use]
pub fn is_other_group(name: &str) -> bool {
    !is_tiered_level(name)
}
