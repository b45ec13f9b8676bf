//! Request target construction.
//!
//! The endpoint is addressed by plain string concatenation so that a base URL
//! carrying its own query string (deployment ids, API keys) is passed through
//! untouched. Only appended values are encoded.

use url::form_urlencoded;

/// Query parameter carrying the bearer token.
pub const TOKEN_PARAM: &str = "idToken";

/// Query parameter naming the script fallback's callback.
pub const CALLBACK_PARAM: &str = "callback";

/// Appends `key=value` to `base`, choosing `&` when `base` already has a query
/// string and `?` otherwise. The value is URL-encoded.
///
/// ```
/// use plasmid_browser::loader::request::append_param;
///
/// assert_eq!(append_param("https://x.test/exec", "a", "b c"), "https://x.test/exec?a=b+c");
/// assert_eq!(append_param("https://x.test/exec?v=1", "a", "b"), "https://x.test/exec?v=1&a=b");
/// ```
#[must_use]
pub fn append_param(base: &str, key: &str, value: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{base}{separator}{key}={encoded}")
}

/// Builds the load target for `token`.
#[must_use]
pub fn load_target(base: &str, token: &str) -> String {
    append_param(base, TOKEN_PARAM, token)
}

/// Builds the script fallback target for an already token-bearing `target`.
#[must_use]
pub fn callback_target(target: &str, callback: &str) -> String {
    append_param(target, CALLBACK_PARAM, callback)
}
