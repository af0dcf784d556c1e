//! Bullet-entry segmentation of raw agenda text.
//!
//! Agenda listings are one long string of bullet-delimited entries.
//! Parenthesized content (ward/council-district annotations) is not part
//! of the address listing, so each entry is truncated at the first `(`.
//! An entry is a property list iff it starts with a digit; headers and
//! prose entries are skipped without error.

/// Internal split sentinel; never present in extracted PDF text.
const SENTINEL: &str = "\u{0}";

/// One delimiter-separated unit of agenda text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletEntry {
    /// Entry text, truncated at the first `(`, newlines flattened, trimmed.
    pub text: String,
    /// True iff the first non-whitespace character is an ASCII digit.
    pub is_property_list: bool,
}

/// Split agenda text into classified bullet entries.
///
/// `markers` is the set of bullet delimiters to split on. Text before
/// the first marker is not an entry and is discarded.
pub fn segment(text: &str, markers: &[String]) -> Vec<BulletEntry> {
    let mut normalized = text.to_owned();
    for marker in markers {
        if !marker.is_empty() {
            normalized = normalized.replace(marker.as_str(), SENTINEL);
        }
    }

    normalized
        .split(SENTINEL)
        .skip(1)
        .map(|chunk| {
            let head = chunk.split('(').next().unwrap_or("");
            let text = head.replace('\n', " ").trim().to_string();
            let is_property_list = text.chars().next().is_some_and(|c| c.is_ascii_digit());
            BulletEntry {
                text,
                is_property_list,
            }
        })
        .collect()
}
