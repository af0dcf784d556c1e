//! Address extraction from agenda text.
//!
//! Three pure stages, safe to recompute or test in isolation:
//! segmentation ([`segment`]), expansion ([`expand_entry`]), and
//! normalization (the [`AddressNormalizer`] trait). The orchestrator
//! chains them; [`extract_candidates`] is the convenience composition of
//! the first two.

pub mod expander;
pub mod normalize;
pub mod segmenter;

pub use expander::{StreetGroup, expand_entry, expand_group, parse_group};
pub use normalize::{AddressNormalizer, RuleBasedNormalizer};
pub use segmenter::{BulletEntry, segment};

/// Segment agenda text and expand every property-list entry into
/// candidate address strings, in agenda order.
pub fn extract_candidates(text: &str, markers: &[String]) -> Vec<String> {
    segment(text, markers)
        .iter()
        .filter(|entry| entry.is_property_list)
        .flat_map(|entry| expand_entry(&entry.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["\u{2022}".into()]
    }

    const AGENDA_TEXT: &str = "\
PROPERTIES FOR CONSIDERATION\n\
\u{2022} Introduction to agenda\n\
\u{2022} 1, 3, 5 Main St (1st District)\n\
\u{2022} 12, 14 Pine St; 9 Oak Ave (2nd District)\n\
\u{2022} Adjournment\n";

    #[test]
    fn full_extraction_in_agenda_order() {
        let candidates = extract_candidates(AGENDA_TEXT, &markers());
        assert_eq!(
            candidates,
            vec![
                "1 MAIN ST",
                "3 MAIN ST",
                "5 MAIN ST",
                "12 PINE ST",
                "14 PINE ST",
                "9 OAK AVE",
            ]
        );
    }

    #[test]
    fn candidate_count_matches_token_sum() {
        // Entry "1, 3, 5 Main St" has one group with three tokens;
        // "12, 14 Pine St; 9 Oak Ave" has groups of two and one.
        let candidates = extract_candidates(AGENDA_TEXT, &markers());
        assert_eq!(candidates.len(), 3 + 2 + 1);
    }

    #[test]
    fn non_digit_entries_contribute_nothing() {
        let text = "\u{2022} Introduction to agenda\n\u{2022} Adjournment\n";
        assert!(extract_candidates(text, &markers()).is_empty());
    }
}
