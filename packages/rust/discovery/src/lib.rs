//! Agenda-listing discovery.
//!
//! The land-bank authority publishes board agendas as PDF links on a
//! listing page. This crate scrapes that page and returns the agenda
//! URLs in document order; the first entry is assumed to be the most
//! recently posted agenda.

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use landbank_shared::{LandbankError, Result};

/// Anchor-text filter: a link counts as an agenda iff its visible text
/// contains this marker.
const AGENDA_ANCHOR_MARKER: &str = "Agenda";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for listing-page requests.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
    /// User-Agent header to send.
    pub user_agent: String,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("landbank/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch the board listing page and return the agenda link URLs it
/// carries, in document order.
///
/// Relative hrefs are resolved against the page URL. Anchors whose text
/// does not contain "Agenda" are ignored. An unreachable or non-2xx
/// listing page is fatal: there is nothing to process without it.
#[instrument(skip_all, fields(board_url = %board_url))]
pub async fn discover_agendas(board_url: &Url, opts: &ListingOptions) -> Result<Vec<Url>> {
    let client = build_client(opts)?;

    let response = client
        .get(board_url.as_str())
        .send()
        .await
        .map_err(|e| LandbankError::Fetch(format!("{board_url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LandbankError::Fetch(format!("{board_url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| LandbankError::Fetch(format!("{board_url}: failed to read body: {e}")))?;

    let urls = agenda_links(&body, board_url);

    info!(count = urls.len(), "agenda links discovered");
    Ok(urls)
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &ListingOptions) -> Result<Client> {
    Client::builder()
        .user_agent(&opts.user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| LandbankError::Fetch(format!("failed to build HTTP client: {e}")))
}

/// Extract agenda links from listing-page HTML, resolved against `base_url`.
fn agenda_links(html: &str, base_url: &Url) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]").expect("anchor selector");

    let mut urls = Vec::new();
    for el in doc.select(&link_sel) {
        let text: String = el.text().collect();
        if !text.contains(AGENDA_ANCHOR_MARKER) {
            continue;
        }

        let Some(href) = el.value().attr("href") else {
            continue;
        };

        match base_url.join(href) {
            Ok(resolved) => urls.push(resolved),
            Err(e) => {
                debug!(href, error = %e, "skipping unresolvable agenda href");
            }
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"<html><body>
        <h1>Board of Directors</h1>
        <a href="/minutes/jan.pdf">January Minutes</a>
        <a href="/agendas/2024-03-12.pdf">March 2024 Agenda</a>
        <a href="https://cdn.example.org/agendas/2024-02-13.pdf">February 2024 Agenda</a>
        <a href="/about">About the board</a>
        <a href="/agendas/2024-01-09.pdf">January 2024 Agenda</a>
    </body></html>"#;

    #[test]
    fn agenda_links_filters_and_preserves_order() {
        let base = Url::parse("https://phillylandbank.org/board/").unwrap();
        let urls = agenda_links(LISTING_HTML, &base);

        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls[0].as_str(),
            "https://phillylandbank.org/agendas/2024-03-12.pdf"
        );
        assert_eq!(
            urls[1].as_str(),
            "https://cdn.example.org/agendas/2024-02-13.pdf"
        );
        assert_eq!(
            urls[2].as_str(),
            "https://phillylandbank.org/agendas/2024-01-09.pdf"
        );
    }

    #[test]
    fn agenda_links_empty_page() {
        let base = Url::parse("https://phillylandbank.org/board/").unwrap();
        let urls = agenda_links("<html><body><p>No links here</p></body></html>", &base);
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn discover_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/board"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(LISTING_HTML))
            .mount(&server)
            .await;

        let board_url = Url::parse(&format!("{}/board", server.uri())).unwrap();
        let urls = discover_agendas(&board_url, &ListingOptions::default())
            .await
            .unwrap();

        assert_eq!(urls.len(), 3);
        // Relative links resolve against the mock server origin.
        assert!(urls[0].as_str().starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn discover_unreachable_listing_is_fatal() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/board"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let board_url = Url::parse(&format!("{}/board", server.uri())).unwrap();
        let result = discover_agendas(&board_url, &ListingOptions::default()).await;

        assert!(matches!(result, Err(LandbankError::Fetch(_))));
    }
}
