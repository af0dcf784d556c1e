//! Agenda PDF fetching and text extraction.
//!
//! Fetches a board agenda PDF over HTTP and extracts its full text. A
//! response whose content-type does not look like a PDF is only a
//! warning — some hosts serve agendas as `application/octet-stream` —
//! but a document the extractor cannot read is fatal, since there is no
//! text to process without it.

mod date;

use chrono::{DateTime, Utc};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use url::Url;

use landbank_shared::{LandbankError, Result};

pub use date::extract_meeting_date;

// ---------------------------------------------------------------------------
// FetchOptions / FetchedAgenda
// ---------------------------------------------------------------------------

/// Configuration for agenda PDF requests.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
    /// User-Agent header to send.
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("landbank/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// An agenda PDF fetched and reduced to plain text.
#[derive(Debug, Clone)]
pub struct FetchedAgenda {
    /// The agenda URL that was fetched.
    pub url: Url,
    /// Full extracted text, all pages concatenated.
    pub text: String,
    /// SHA-256 of the raw PDF bytes, for provenance.
    pub content_hash: String,
    /// When the fetch happened.
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Fetch + extract
// ---------------------------------------------------------------------------

/// Fetch an agenda PDF and extract its text.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_agenda_text(url: &Url, opts: &FetchOptions) -> Result<FetchedAgenda> {
    let client = Client::builder()
        .user_agent(&opts.user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| LandbankError::Fetch(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| LandbankError::Fetch(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LandbankError::Fetch(format!("{url}: HTTP {status}")));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.to_lowercase().contains("pdf") {
        warn!(%content_type, "content-type does not look like a PDF, extracting anyway");
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LandbankError::Fetch(format!("{url}: failed to read body: {e}")))?;

    let agenda = extract_from_bytes(url.clone(), &bytes)?;

    info!(
        chars = agenda.text.len(),
        content_hash = %agenda.content_hash,
        fetched_at = %agenda.fetched_at,
        "agenda text extracted"
    );

    Ok(agenda)
}

/// Extract text from in-memory PDF bytes (also used by the CLI for local files).
pub fn extract_from_bytes(url: Url, bytes: &[u8]) -> Result<FetchedAgenda> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| LandbankError::extraction(format!("{url}: {e}")))?;

    Ok(FetchedAgenda {
        url,
        text,
        content_hash: compute_hash(bytes),
        fetched_at: Utc::now(),
    })
}

/// SHA-256 of raw content, hex encoded.
fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_hash_is_stable() {
        let hash = compute_hash(b"hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn extract_from_garbage_bytes_fails() {
        let url = Url::parse("https://example.org/agenda.pdf").unwrap();
        let result = extract_from_bytes(url, b"this is not a pdf document");
        assert!(matches!(result, Err(LandbankError::Extraction { .. })));
    }

    #[tokio::test]
    async fn fetch_non_success_status_is_fatal() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/agenda.pdf"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/agenda.pdf", server.uri())).unwrap();
        let result = fetch_agenda_text(&url, &FetchOptions::default()).await;
        assert!(matches!(result, Err(LandbankError::Fetch(_))));
    }

    #[tokio::test]
    async fn fetch_unparseable_body_is_extraction_error() {
        let server = wiremock::MockServer::start().await;

        // Wrong content-type only warns; the unreadable body is the failure.
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/agenda.pdf"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>not a pdf</html>"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/agenda.pdf", server.uri())).unwrap();
        let result = fetch_agenda_text(&url, &FetchOptions::default()).await;
        assert!(matches!(result, Err(LandbankError::Extraction { .. })));
    }
}
