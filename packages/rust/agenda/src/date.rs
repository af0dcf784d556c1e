//! Meeting-date extraction from agenda text.
//!
//! Agendas carry a header block like:
//!
//! ```text
//! PHILADELPHIA LAND BANK
//! BOARD OF DIRECTORS MEETING
//! TUESDAY, MARCH 12, 2024
//! ```
//!
//! The date is everything after the weekday on the line following
//! `MEETING`, up to and including the four-digit year. The archival
//! table is keyed by this date, so its absence is fatal to the run.

use std::sync::LazyLock;

use regex::Regex;

use landbank_shared::{LandbankError, Result};

/// Matches the line after `MEETING`, capturing from the end of the
/// weekday (`...DAY`) through the four-digit year.
static MEETING_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MEETING\n.*DAY(.*?20\d\d)").expect("meeting date regex"));

/// Extract the meeting date from agenda text.
///
/// Commas are stripped and the result trimmed, e.g. `"MARCH 12 2024"`.
pub fn extract_meeting_date(text: &str) -> Result<String> {
    let caps = MEETING_DATE_RE.captures(text).ok_or_else(|| {
        LandbankError::meeting_date("agenda text does not contain a MEETING date header")
    })?;

    let date = caps[1].replace(',', "");
    let date = date.trim();

    if date.is_empty() {
        return Err(LandbankError::meeting_date(
            "MEETING header matched but the date portion is empty",
        ));
    }

    Ok(date.to_string())
}
