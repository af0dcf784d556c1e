//! Output sink and run-state store.
//!
//! Each run overwrites `current_agenda.csv` in the output directory and
//! writes an archival copy keyed by the meeting date under `archive/`.
//! A write failure to the configured destination falls back once to a
//! default local destination rather than losing the run's data; only a
//! failure of the fallback too is fatal.
//!
//! The run-state store is a JSON array of previously seen agenda URLs,
//! used by the orchestrator for its freshness short-circuit.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use landbank_shared::{LandbankError, MeetingRecord, Result};

/// File name of the always-current table.
const CURRENT_FILE_NAME: &str = "current_agenda.csv";

/// Subdirectory holding per-meeting archival tables.
const ARCHIVE_DIR_NAME: &str = "archive";

// ---------------------------------------------------------------------------
// CSV row shape
// ---------------------------------------------------------------------------

/// One output row: an enriched address flattened with the meeting metadata.
/// Column names match the historical table layout consumed downstream.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "ADDRESS")]
    address: &'a str,
    #[serde(rename = "OPA")]
    opa: Option<&'a str>,
    #[serde(rename = "PWD")]
    pwd: Option<&'a str>,
    #[serde(rename = "lat")]
    lat: Option<f64>,
    #[serde(rename = "lon")]
    lon: Option<f64>,
    #[serde(rename = "PLB_MEETING_DATE")]
    meeting_date: &'a str,
    #[serde(rename = "PLB_AGENDA_URL")]
    agenda_url: &'a str,
}

// ---------------------------------------------------------------------------
// Archive key
// ---------------------------------------------------------------------------

/// Filesystem-safe archival key for a meeting date: lowercased, spaces
/// replaced by underscores. Deterministic, so two runs over the same
/// meeting always resolve to the same archive file.
pub fn archive_key(meeting_date: &str) -> String {
    meeting_date.to_lowercase().replace(' ', "_")
}

// ---------------------------------------------------------------------------
// OutputSink
// ---------------------------------------------------------------------------

/// Where a record set ended up.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Path of the current table written this run.
    pub current_path: PathBuf,
    /// Path of the archival table written this run.
    pub archive_path: PathBuf,
    /// Number of rows written.
    pub rows: usize,
    /// True if the primary destination failed and the fallback was used.
    pub used_fallback: bool,
}

/// CSV output sink with a one-shot fallback destination.
pub struct OutputSink {
    dir: PathBuf,
    fallback_dir: PathBuf,
}

impl OutputSink {
    /// Sink writing to `dir`, falling back to the current working
    /// directory if `dir` is unwritable.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fallback_dir: PathBuf::from("."),
        }
    }

    /// Override the fallback destination.
    pub fn with_fallback(mut self, fallback_dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = fallback_dir.into();
        self
    }

    /// Write the record set to the current and archival tables.
    ///
    /// On a primary-destination failure, retries once against the
    /// fallback destination and only then gives up.
    pub fn write_record(&self, record: &MeetingRecord) -> Result<WriteSummary> {
        match self.write_to(&self.dir, record, false) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(
                    dir = %self.dir.display(),
                    error = %e,
                    fallback = %self.fallback_dir.display(),
                    "primary output destination failed, trying fallback"
                );
                self.write_to(&self.fallback_dir, record, true)
            }
        }
    }

    fn write_to(&self, dir: &Path, record: &MeetingRecord, used_fallback: bool) -> Result<WriteSummary> {
        // A configured-but-absent destination is created, not diverted
        // to the fallback.
        std::fs::create_dir_all(dir).map_err(|e| LandbankError::io(dir, e))?;

        let current_path = dir.join(CURRENT_FILE_NAME);
        write_csv(&current_path, record)?;

        let archive_dir = dir.join(ARCHIVE_DIR_NAME);
        std::fs::create_dir_all(&archive_dir).map_err(|e| LandbankError::io(&archive_dir, e))?;

        let archive_path = archive_dir.join(format!("{}.csv", archive_key(&record.meeting_date)));
        write_csv(&archive_path, record)?;

        info!(
            rows = record.addresses.len(),
            archive = %archive_path.display(),
            "record set written"
        );

        Ok(WriteSummary {
            current_path,
            archive_path,
            rows: record.addresses.len(),
            used_fallback,
        })
    }
}

/// Serialize the record's addresses as one CSV table.
fn write_csv(path: &Path, record: &MeetingRecord) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| LandbankError::Sink(format!("{}: {e}", path.display())))?;

    for enriched in &record.addresses {
        let row = CsvRow {
            address: enriched.address.as_str(),
            opa: enriched.opa_id.as_deref(),
            pwd: enriched.pwd_id.as_deref(),
            lat: enriched.lat,
            lon: enriched.lon,
            meeting_date: &record.meeting_date,
            agenda_url: &record.agenda_url,
        };
        writer
            .serialize(row)
            .map_err(|e| LandbankError::Sink(format!("{}: {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| LandbankError::Sink(format!("{}: {e}", path.display())))?;

    debug!(path = %path.display(), "csv table written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Run-state store
// ---------------------------------------------------------------------------

/// Load the previously seen agenda URLs. A missing file means no runs
/// have happened yet and yields an empty list.
pub fn load_seen_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "no run state yet");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| LandbankError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| LandbankError::Sink(format!("{}: invalid run state: {e}", path.display())))
}

/// Persist the full list of currently discovered agenda URLs.
pub fn store_seen_urls(path: &Path, urls: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| LandbankError::io(parent, e))?;
        }
    }

    let content = serde_json::to_string(urls)
        .map_err(|e| LandbankError::Sink(format!("serializing run state: {e}")))?;
    std::fs::write(path, content).map_err(|e| LandbankError::io(path, e))?;
    debug!(path = %path.display(), count = urls.len(), "run state stored");
    Ok(())
}
