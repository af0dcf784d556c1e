//! End-to-end run pipeline: listing → agenda text → extraction →
//! enrichment → output tables.
//!
//! Everything local to a single candidate address or bullet entry is a
//! soft failure; only the source text, the meeting date, and the
//! fallback sink are run-fatal. Cancellation is honored between
//! addresses (never mid-request) and the partial record set completed
//! so far is still written.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};
use url::Url;

use landbank_agenda::{FetchOptions, FetchedAgenda};
use landbank_discovery::ListingOptions;
use landbank_enrich::{AisClient, AisConfig};
use landbank_extract::{AddressNormalizer, extract_candidates};
use landbank_shared::{
    CancelToken, LandbankError, MeetingRecord, NormalizedAddress, Result,
};
use landbank_storage::{OutputSink, load_seen_urls, store_seen_urls};

// ---------------------------------------------------------------------------
// Config / results
// ---------------------------------------------------------------------------

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Board listing page to discover agendas from.
    pub board_url: Url,
    /// Listing-page request settings.
    pub listing: ListingOptions,
    /// Agenda PDF request settings.
    pub fetch: FetchOptions,
    /// Bullet markers delimiting agenda entries.
    pub bullet_markers: Vec<String>,
    /// Lookup-service settings (key already resolved by the caller).
    pub ais: AisConfig,
    /// Output directory for the current and archive tables.
    pub output_dir: PathBuf,
    /// Path of the seen-URL run-state file.
    pub state_file: PathBuf,
}

/// Outcome of a pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The discovered agenda count matched the stored count; nothing to do.
    NoNewAgendas,
    /// A new agenda was processed (possibly partially, on cancellation).
    Completed(RunSummary),
}

/// Summary of a completed (or cancelled-partial) run.
#[derive(Debug)]
pub struct RunSummary {
    /// Meeting date extracted from the agenda.
    pub meeting_date: String,
    /// The agenda that was processed.
    pub agenda_url: Url,
    /// Candidate addresses surviving normalization.
    pub addresses_total: usize,
    /// Addresses actually looked up (smaller than total if cancelled).
    pub addresses_enriched: usize,
    /// Archival table path.
    pub archive_path: PathBuf,
    /// True if the run was cut short by cancellation.
    pub cancelled: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each address lookup.
    fn address_lookup(&self, address: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn address_lookup(&self, _address: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Agenda text seam
// ---------------------------------------------------------------------------

/// Source of extracted agenda text. The production implementation
/// fetches and reads the PDF; tests substitute canned text.
#[allow(async_fn_in_trait)]
pub trait AgendaTextSource {
    async fn fetch_text(&self, url: &Url) -> Result<FetchedAgenda>;
}

/// Production source: HTTP fetch + PDF text extraction.
pub struct PdfAgendaSource {
    options: FetchOptions,
}

impl PdfAgendaSource {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl AgendaTextSource for PdfAgendaSource {
    async fn fetch_text(&self, url: &Url) -> Result<FetchedAgenda> {
        landbank_agenda::fetch_agenda_text(url, &self.options).await
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full pipeline.
///
/// 1. Discover agenda links on the board page
/// 2. Freshness short-circuit against the stored seen-URL count
/// 3. Fetch the newest agenda's text and meeting date
/// 4. Segment, expand, and normalize addresses
/// 5. Enrich sequentially against the lookup service
/// 6. Write the current + archival tables, persist run state
#[instrument(skip_all, fields(board_url = %config.board_url))]
pub async fn run_pipeline<S: AgendaTextSource>(
    config: &RunConfig,
    source: &S,
    normalizer: &dyn AddressNormalizer,
    progress: &dyn ProgressReporter,
    cancel: CancelToken,
) -> Result<RunOutcome> {
    let start = Instant::now();

    // --- Phase 1: discovery ---
    progress.phase("Discovering agendas");
    let agenda_urls = landbank_discovery::discover_agendas(&config.board_url, &config.listing).await?;

    if agenda_urls.is_empty() {
        return Err(LandbankError::Fetch(format!(
            "no agenda links found on {}",
            config.board_url
        )));
    }

    // --- Phase 2: freshness short-circuit ---
    // Count-based comparison: an agenda swapped for another between
    // runs keeps the count equal and is missed.
    let seen = load_seen_urls(&config.state_file)?;
    if agenda_urls.len() == seen.len() {
        info!(count = seen.len(), "no new agendas to parse");
        return Ok(RunOutcome::NoNewAgendas);
    }

    // The first listed agenda is the most recently posted.
    let agenda_url = agenda_urls[0].clone();
    info!(url = %agenda_url, "processing newly posted agenda");

    // --- Phase 3: agenda text + meeting date ---
    progress.phase("Fetching agenda");
    let agenda = source.fetch_text(&agenda_url).await?;
    let meeting_date = landbank_agenda::extract_meeting_date(&agenda.text)?;
    info!(%meeting_date, "meeting date extracted");

    // --- Phase 4: extraction + normalization ---
    progress.phase("Extracting addresses");
    let candidates = extract_candidates(&agenda.text, &config.bullet_markers);
    let normalized = normalize_candidates(&candidates, normalizer);
    info!(
        candidates = candidates.len(),
        normalized = normalized.len(),
        "addresses extracted from agenda"
    );

    // --- Phase 5: sequential enrichment ---
    progress.phase("Enriching addresses");
    let client = AisClient::new(config.ais.clone())?;
    let total = normalized.len();

    let mut addresses = Vec::with_capacity(total);
    let mut cancelled = false;
    for (i, address) in normalized.into_iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                completed = addresses.len(),
                remaining = total - addresses.len(),
                "run cancelled, keeping partial results"
            );
            cancelled = true;
            break;
        }
        progress.address_lookup(address.as_str(), i + 1, total);
        addresses.push(client.enrich(address, &cancel).await);
    }
    let enriched_count = addresses.len();

    // --- Phase 6: output ---
    progress.phase("Writing output tables");
    let record = MeetingRecord {
        meeting_date: meeting_date.clone(),
        agenda_url: agenda_url.to_string(),
        addresses,
    };

    let sink = OutputSink::new(&config.output_dir);
    let summary = sink.write_record(&record)?;

    if cancelled {
        // Leave the run state untouched so the next run reprocesses
        // this agenda in full.
        warn!("skipping run-state update after cancellation");
    } else {
        let urls: Vec<String> = agenda_urls.iter().map(|u| u.to_string()).collect();
        store_seen_urls(&config.state_file, &urls)?;
    }

    let result = RunSummary {
        meeting_date,
        agenda_url,
        addresses_total: total,
        addresses_enriched: enriched_count,
        archive_path: summary.archive_path,
        cancelled,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        addresses = result.addresses_enriched,
        cancelled = result.cancelled,
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline run complete"
    );

    Ok(RunOutcome::Completed(result))
}

/// Feed every candidate through the normalizer, dropping (and logging)
/// the ones it rejects. Order and duplicates are preserved.
fn normalize_candidates(
    candidates: &[String],
    normalizer: &dyn AddressNormalizer,
) -> Vec<NormalizedAddress> {
    candidates
        .iter()
        .filter_map(|raw| match normalizer.parse(raw) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                warn!(candidate = raw.as_str(), error = %e, "dropping unparseable candidate");
                None
            }
        })
        .collect()
}
