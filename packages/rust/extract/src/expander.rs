//! Expansion of compact street/house-number notation into candidates.
//!
//! Within a property-list entry, `;` separates streets and `,` separates
//! house numbers on a street. The last comma token of a group already
//! embeds the street name — that is how the source notation is written,
//! not a heuristic — so only the preceding tokens get the street name
//! suffixed:
//!
//! ```text
//! "1, 3, 5 MAIN ST"  →  ["1 MAIN ST", "3 MAIN ST", "5 MAIN ST"]
//! ```

use tracing::warn;

use landbank_shared::{LandbankError, Result};

/// A `;`-separated sub-unit of a bullet entry: one street and its
/// house numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetGroup {
    /// Street name shared by every token in the group, upper-cased,
    /// periods removed.
    pub street_name: String,
    /// Raw `,`-separated tokens, in order.
    pub house_number_tokens: Vec<String>,
}

/// Parse one street group string.
///
/// The street name is whatever follows the leading run of digits,
/// whitespace, commas, dashes, and asterisks — a structural property of
/// the source notation, where that prefix spans the entire group.
pub fn parse_group(group: &str) -> Result<StreetGroup> {
    let rest = group.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || c == ',' || c == '-' || c == '*'
    });
    let street_name = rest.trim().to_uppercase().replace('.', "");

    if street_name.is_empty() {
        return Err(LandbankError::expansion(format!(
            "no street name in group {group:?}"
        )));
    }

    Ok(StreetGroup {
        street_name,
        house_number_tokens: group.split(',').map(str::to_string).collect(),
    })
}

/// Expand one street group into candidate address strings, one per
/// house-number token.
pub fn expand_group(group: &str) -> Result<Vec<String>> {
    let parsed = parse_group(group)?;
    let last = parsed.house_number_tokens.len() - 1;

    let candidates = parsed
        .house_number_tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            // Strip footnote/abbreviation markers before reassembly.
            let cleaned = token.replace(['*', '.'], "");
            let cleaned = cleaned.trim().to_uppercase();
            if i == last {
                // Final token already embeds the street name.
                cleaned
            } else {
                format!("{cleaned} {}", parsed.street_name)
            }
        })
        .collect();

    Ok(candidates)
}

/// Expand a whole property-list entry. A malformed group is skipped with
/// a warning; it never aborts the entry or the run.
pub fn expand_entry(entry: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for group in entry.split(';') {
        match expand_group(group) {
            Ok(mut group_candidates) => candidates.append(&mut group_candidates),
            Err(e) => {
                warn!(group, error = %e, "skipping malformed street group");
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_expands_in_order() {
        let candidates = expand_group("1, 3, 5 MAIN ST").unwrap();
        assert_eq!(candidates, vec!["1 MAIN ST", "3 MAIN ST", "5 MAIN ST"]);
    }

    #[test]
    fn candidate_count_equals_token_count() {
        for group in ["1, 3, 5 MAIN ST", "1234 Wharton St", "8, 10 N. 5th St"] {
            let parsed = parse_group(group).unwrap();
            let candidates = expand_group(group).unwrap();
            assert_eq!(candidates.len(), parsed.house_number_tokens.len());
        }
    }

    #[test]
    fn single_address_group() {
        let candidates = expand_group("1234 Wharton St").unwrap();
        assert_eq!(candidates, vec!["1234 WHARTON ST"]);
    }

    #[test]
    fn strips_footnote_markers_and_periods() {
        let candidates = expand_group("12*, 14 N. Broad St.").unwrap();
        assert_eq!(candidates, vec!["12 N BROAD ST", "14 N BROAD ST"]);
    }

    #[test]
    fn street_name_skips_leading_prefix_run() {
        let parsed = parse_group("123-25, 127 Germantown Ave").unwrap();
        assert_eq!(parsed.street_name, "GERMANTOWN AVE");
        assert_eq!(parsed.house_number_tokens.len(), 2);
    }

    #[test]
    fn group_without_street_name_is_an_error() {
        let err = expand_group("12, 14, 16").unwrap_err();
        assert!(matches!(err, LandbankError::Expansion { .. }));
    }

    #[test]
    fn entry_with_bad_group_keeps_good_groups() {
        // Middle group has no street name; the other two survive.
        let candidates = expand_entry("1, 3 Pine St; 44, 46; 9 Oak Ave");
        assert_eq!(candidates, vec!["1 PINE ST", "3 PINE ST", "9 OAK AVE"]);
    }

    #[test]
    fn multi_street_entry_preserves_order() {
        let candidates = expand_entry("12, 14 Pine St; 9 Oak Ave");
        assert_eq!(candidates, vec!["12 PINE ST", "14 PINE ST", "9 OAK AVE"]);
    }

    #[test]
    fn duplicates_are_preserved() {
        let candidates = expand_entry("5, 5 Main St");
        assert_eq!(candidates, vec!["5 MAIN ST", "5 MAIN ST"]);
    }
}
