//! Core domain types shared across the pipeline crates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NormalizedAddress
// ---------------------------------------------------------------------------

/// A canonical address string produced by an address normalizer.
///
/// Normalization is deterministic and idempotent: feeding a
/// `NormalizedAddress` back through the same normalizer is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAddress(pub String);

impl NormalizedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EnrichedAddress
// ---------------------------------------------------------------------------

/// A normalized address plus whatever the lookup service returned for it.
///
/// The optional fields are populated only on a Matched lookup; NotFound
/// and soft lookup failures leave them empty rather than aborting the
/// run. Every `EnrichedAddress` traces back to exactly one candidate
/// address string from the agenda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedAddress {
    /// The normalized address that was looked up.
    pub address: NormalizedAddress,
    /// OPA (Office of Property Assessment) account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opa_id: Option<String>,
    /// PWD (Water Department) parcel identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd_id: Option<String>,
    /// Parcel latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Parcel longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl EnrichedAddress {
    /// An address with all enrichment fields empty (NotFound / soft failure).
    pub fn unmatched(address: NormalizedAddress) -> Self {
        Self {
            address,
            opa_id: None,
            pwd_id: None,
            lat: None,
            lon: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MeetingRecord
// ---------------------------------------------------------------------------

/// The final output of one pipeline run: every enriched address from a
/// single board agenda, tagged with the shared meeting metadata.
///
/// Addresses keep agenda order; duplicates are legal and preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// Meeting date as printed in the agenda (commas stripped), e.g.
    /// `"MARCH 12 2024"`.
    pub meeting_date: String,
    /// URL of the agenda PDF this record was built from.
    pub agenda_url: String,
    /// Enriched addresses in agenda order.
    pub addresses: Vec<EnrichedAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_address_serde_transparent() {
        let addr = NormalizedAddress("1 MAIN ST".into());
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, "\"1 MAIN ST\"");
    }

    #[test]
    fn unmatched_has_empty_fields() {
        let e = EnrichedAddress::unmatched(NormalizedAddress("1 MAIN ST".into()));
        assert!(e.opa_id.is_none());
        assert!(e.pwd_id.is_none());
        assert!(e.lat.is_none());
        assert!(e.lon.is_none());
    }

    #[test]
    fn meeting_record_roundtrip() {
        let record = MeetingRecord {
            meeting_date: "MARCH 12 2024".into(),
            agenda_url: "https://example.org/agenda.pdf".into(),
            addresses: vec![EnrichedAddress {
                address: NormalizedAddress("1 MAIN ST".into()),
                opa_id: Some("871234567".into()),
                pwd_id: Some("123456".into()),
                lat: Some(39.95),
                lon: Some(-75.16),
            }],
        };

        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: MeetingRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.addresses.len(), 1);
        assert_eq!(parsed.addresses[0].opa_id.as_deref(), Some("871234567"));
    }
}
