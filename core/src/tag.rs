//! Tag normalization for path segments.
//!
//! The API addresses players, clans and CWL wars by tag, and expects the
//! tag's `#` to arrive percent-encoded (`%23`) followed by the uppercase tag.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters gets encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Normalize a raw tag into its encoded path segment.
///
/// Accepts `#2abc`, `2abc` or `  #2ABC ` alike; all yield `%232ABC`.
pub fn normalize_tag(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let bare = upper.strip_prefix('#').unwrap_or(&upper);
    format!("%23{}", utf8_percent_encode(bare, PATH_SEGMENT))
}

/// Percent-encode a non-tag path segment such as a season id.
pub(crate) fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}
