//! AIS (Address Information System) enrichment client.
//!
//! Looks up each normalized address against the city's rate-limited
//! lookup service and maps the response to a per-address outcome.
//! Lookups are strictly sequential — one outstanding request at a time —
//! to avoid compounding rate-limit pressure, and every failure mode
//! short of cancellation is soft: the address keeps empty enrichment
//! fields and the run continues.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use landbank_shared::{CancelToken, EnrichedAddress, LandbankError, NormalizedAddress, Result};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Lookup-service configuration, injected at construction.
///
/// The gatekeeper key arrives here explicitly — it is resolved from the
/// environment by the caller, never read from ambient global state.
#[derive(Debug, Clone)]
pub struct AisConfig {
    /// Search endpoint base, e.g. `https://api.phila.gov/ais_doc/v1/search`.
    pub base_url: String,
    /// API gatekeeper key, sent as a query parameter.
    pub gatekeeper_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Wait after a 429 before the single retry.
    pub rate_limit_backoff: Duration,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal state of one address lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The service returned parcel data for the address.
    Matched(ParcelRecord),
    /// No parcel matches the address; not an error.
    NotFound,
    /// The lookup failed softly (server error, transport error, or a
    /// second rate-limit on the retry). Enrichment fields stay empty.
    Failed { status: Option<u16> },
}

/// Parcel identifiers and coordinates from a matched lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelRecord {
    pub opa_account: Option<String>,
    pub pwd_parcel: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[lon, lat]` per GeoJSON.
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    /// The service is inconsistent about string vs. number identifiers.
    #[serde(default)]
    opa_account_num: Option<serde_json::Value>,
    #[serde(default)]
    pwd_parcel_id: Option<serde_json::Value>,
}

/// Render a string-or-number identifier field as a string.
fn stringify_id(value: &Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Sequential enrichment client for the AIS lookup service.
pub struct AisClient {
    config: AisConfig,
    client: Client,
}

impl AisClient {
    /// Build a client from injected configuration.
    pub fn new(config: AisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LandbankError::Lookup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn lookup_url(&self, address: &NormalizedAddress) -> String {
        format!(
            "{}/{}?gatekeeperKey={}",
            self.config.base_url,
            urlencoding::encode(address.as_str()),
            self.config.gatekeeper_key,
        )
    }

    /// Look up a single address.
    ///
    /// On a 429 the client waits `rate_limit_backoff` once (cancellable)
    /// and retries the same request once; whatever the retry yields is
    /// the outcome, with a second 429 counting as a failure. All other
    /// non-2xx statuses and transport errors are soft failures.
    #[instrument(skip_all, fields(address = %address))]
    pub async fn lookup(&self, address: &NormalizedAddress, cancel: &CancelToken) -> LookupOutcome {
        let url = self.lookup_url(address);

        let outcome = match self.send(&url).await {
            Some((status, _)) if status == StatusCode::TOO_MANY_REQUESTS => {
                warn!(
                    backoff_secs = self.config.rate_limit_backoff.as_secs(),
                    "rate limited, backing off before single retry"
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return LookupOutcome::Failed {
                            status: Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
                        };
                    }
                    _ = tokio::time::sleep(self.config.rate_limit_backoff) => {}
                }
                match self.send(&url).await {
                    Some((status, _)) if status == StatusCode::TOO_MANY_REQUESTS => {
                        warn!("still rate limited after retry, giving up on this address");
                        LookupOutcome::Failed {
                            status: Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
                        }
                    }
                    Some((status, body)) => evaluate(address, status, &body),
                    None => LookupOutcome::Failed { status: None },
                }
            }
            Some((status, body)) => evaluate(address, status, &body),
            None => LookupOutcome::Failed { status: None },
        };

        debug!(?outcome, "lookup finished");
        outcome
    }

    /// Enrich the given address with whatever the lookup yielded.
    pub async fn enrich(&self, address: NormalizedAddress, cancel: &CancelToken) -> EnrichedAddress {
        match self.lookup(&address, cancel).await {
            LookupOutcome::Matched(parcel) => {
                info!(address = %address, opa = ?parcel.opa_account, "parcel matched");
                EnrichedAddress {
                    address,
                    opa_id: parcel.opa_account,
                    pwd_id: parcel.pwd_parcel,
                    lat: parcel.lat,
                    lon: parcel.lon,
                }
            }
            LookupOutcome::NotFound => {
                info!(address = %address, "no parcel match, continuing");
                EnrichedAddress::unmatched(address)
            }
            LookupOutcome::Failed { status } => {
                warn!(address = %address, ?status, "lookup failed, leaving fields empty");
                EnrichedAddress::unmatched(address)
            }
        }
    }

    /// Issue one GET; `None` means the request never produced a response.
    async fn send(&self, url: &str) -> Option<(StatusCode, String)> {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Some((status, body))
            }
            Err(e) => {
                warn!(error = %e, "lookup request failed in transport");
                None
            }
        }
    }
}

/// Map a terminal response (anything but a first 429) to an outcome.
fn evaluate(address: &NormalizedAddress, status: StatusCode, body: &str) -> LookupOutcome {
    if status == StatusCode::NOT_FOUND {
        return LookupOutcome::NotFound;
    }

    if !status.is_success() {
        warn!(address = %address, status = status.as_u16(), body, "lookup returned failure status");
        return LookupOutcome::Failed {
            status: Some(status.as_u16()),
        };
    }

    let parsed: SearchResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(address = %address, error = %e, "unparseable lookup response body");
            return LookupOutcome::Failed {
                status: Some(status.as_u16()),
            };
        }
    };

    let Some(feature) = parsed.features.first() else {
        // 200 with no features behaves like NotFound: empty fields, continue.
        debug!(address = %address, "response has no features");
        return LookupOutcome::NotFound;
    };

    let (lon, lat) = feature
        .geometry
        .as_ref()
        .map(|g| (g.coordinates.first().copied(), g.coordinates.get(1).copied()))
        .unwrap_or((None, None));

    let (opa_account, pwd_parcel) = feature
        .properties
        .as_ref()
        .map(|p| (stringify_id(&p.opa_account_num), stringify_id(&p.pwd_parcel_id)))
        .unwrap_or((None, None));

    LookupOutcome::Matched(ParcelRecord {
        opa_account,
        pwd_parcel,
        lat,
        lon,
    })
}
