//! Error types for the land-bank agenda pipeline.
//!
//! Library crates use [`LandbankError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The taxonomy distinguishes run-fatal failures (source text or meeting
//! date unavailable, fallback sink write failed) from soft failures local
//! to a single bullet entry, street group, or candidate address. Soft
//! failures are logged by the component that hits them and never abort
//! the run.

use std::path::PathBuf;

/// Top-level error type for all pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum LandbankError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error fetching the listing page or agenda PDF.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// PDF text extraction failed (corrupt or unreadable document).
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// The meeting-date pattern was absent from the agenda text.
    /// Fatal: archival keying depends on the date.
    #[error("meeting date not found: {message}")]
    MeetingDate { message: String },

    /// Malformed street/number syntax in a single street group.
    /// Soft: the group is skipped, the run continues.
    #[error("expansion error: {message}")]
    Expansion { message: String },

    /// The address normalizer rejected a single candidate.
    /// Soft: the candidate is dropped, the run continues.
    #[error("normalization error: {message}")]
    Normalization { message: String },

    /// Lookup-service client construction or request-building error.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Output sink write failure.
    #[error("sink error: {0}")]
    Sink(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LandbankError>;

impl LandbankError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a meeting-date error from any displayable message.
    pub fn meeting_date(msg: impl Into<String>) -> Self {
        Self::MeetingDate {
            message: msg.into(),
        }
    }

    /// Create an expansion error from any displayable message.
    pub fn expansion(msg: impl Into<String>) -> Self {
        Self::Expansion {
            message: msg.into(),
        }
    }

    /// Create a normalization error from any displayable message.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
