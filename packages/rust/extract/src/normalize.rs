//! Canonical address normalization.
//!
//! The canonical-address capability is a narrow, pluggable contract: the
//! pipeline only needs `parse(raw) -> NormalizedAddress | failure`. The
//! default implementation is rule-based; a lookup-table or remote parser
//! can be swapped in without touching the core.

use landbank_shared::{LandbankError, NormalizedAddress, Result};

/// The canonical-address capability.
///
/// Implementations must be pure and idempotent: the same input always
/// yields the same output, and normalizing an already-normalized
/// address is a no-op.
pub trait AddressNormalizer {
    /// Parse a raw candidate string into a canonical address, or report
    /// a normalization failure for that single candidate.
    fn parse(&self, raw: &str) -> Result<NormalizedAddress>;
}

// ---------------------------------------------------------------------------
// RuleBasedNormalizer
// ---------------------------------------------------------------------------

/// Rule-based normalizer: upper-cases, collapses whitespace, strips
/// punctuation, and standardizes street-suffix and directional words to
/// their postal abbreviations.
///
/// Idempotent by construction: every output token is a fixed point of
/// the token mapping.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedNormalizer;

impl RuleBasedNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl AddressNormalizer for RuleBasedNormalizer {
    fn parse(&self, raw: &str) -> Result<NormalizedAddress> {
        let cleaned = raw.replace(['.', '*'], "").replace(',', " ");

        let tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(|t| canonical_token(&t.to_uppercase()).to_string())
            .collect();

        let Some(first) = tokens.first() else {
            return Err(LandbankError::normalization("empty candidate"));
        };

        if !first.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(LandbankError::normalization(format!(
                "{raw:?} does not begin with a house number"
            )));
        }

        if tokens.len() < 2 {
            return Err(LandbankError::normalization(format!(
                "{raw:?} has a house number but no street"
            )));
        }

        Ok(NormalizedAddress(tokens.join(" ")))
    }
}

/// Map a suffix or directional word to its canonical abbreviation.
/// Canonical forms map to themselves, which is what makes normalization
/// idempotent.
fn canonical_token(token: &str) -> &str {
    match token {
        "STREET" => "ST",
        "AVENUE" | "AV" => "AVE",
        "ROAD" => "RD",
        "DRIVE" => "DR",
        "LANE" => "LN",
        "BOULEVARD" => "BLVD",
        "PLACE" => "PL",
        "COURT" => "CT",
        "TERRACE" => "TER",
        "CIRCLE" => "CIR",
        "ALLEY" => "ALY",
        "NORTH" => "N",
        "SOUTH" => "S",
        "EAST" => "E",
        "WEST" => "W",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_suffixes_and_directionals() {
        let n = RuleBasedNormalizer::new();
        let parsed = n.parse("1735 north fifth street").unwrap();
        assert_eq!(parsed.as_str(), "1735 N FIFTH ST");
    }

    #[test]
    fn strips_punctuation() {
        let n = RuleBasedNormalizer::new();
        let parsed = n.parse("12 N. Broad St.").unwrap();
        assert_eq!(parsed.as_str(), "12 N BROAD ST");
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = RuleBasedNormalizer::new();
        for raw in [
            "1 MAIN ST",
            "1735 North Fifth Street",
            "12, N. Broad St",
            "123-25 Germantown Avenue",
        ] {
            let once = n.parse(raw).unwrap();
            let twice = n.parse(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn rejects_candidates_without_house_number() {
        let n = RuleBasedNormalizer::new();
        assert!(n.parse("Introduction to agenda").is_err());
        assert!(n.parse("").is_err());
    }

    #[test]
    fn rejects_house_number_without_street() {
        let n = RuleBasedNormalizer::new();
        let err = n.parse("44").unwrap_err();
        assert!(matches!(err, LandbankError::Normalization { .. }));
    }

    #[test]
    fn ranged_house_numbers_survive() {
        let n = RuleBasedNormalizer::new();
        let parsed = n.parse("123-25 Germantown Ave").unwrap();
        assert_eq!(parsed.as_str(), "123-25 GERMANTOWN AVE");
    }
}
