//! Readers for the segment and scoring-region file formats.
//!
//! Segment files are read into [`Sessions`]; the format is picked from the file extension
//! (see [`SegmentFormat`]). Scoring regions are read from UEM files (see [`uem`]).

pub mod rttm;
pub mod seglst;
pub mod stm;
pub mod uem;

use std::path::Path;

use anyhow::{anyhow, Context};
use tokio::fs;
use tracing::{debug, instrument};

use crate::segment::Sessions;
use crate::Result;

/// Error returned when a line of an input file cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Line does not have enough fields.
    #[error("line {line}: expected at least {expected} fields, got {actual}")]
    MissingFields {
        /// 1-based line number
        line: usize,
        /// Minimum number of fields
        expected: usize,
        /// Number of fields found
        actual: usize,
    },

    /// A numeric field could not be parsed.
    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidNumber {
        /// 1-based line number
        line: usize,
        /// Name of the field
        field: &'static str,
        /// Raw field value
        value: String,
    },

    /// A time range ends before it starts.
    #[error("line {line}: end time {end} is before start time {start}")]
    NegativeDuration {
        /// 1-based line number
        line: usize,
        /// Start time, in seconds
        start: f64,
        /// End time, in seconds
        end: f64,
    },

    /// Malformed JSON content.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supported segment file formats.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SegmentFormat {
    /// NIST Rich Transcription Time Marked (`.rttm`)
    Rttm,

    /// NIST Segment Time Mark (`.stm`)
    Stm,

    /// Segment-wise long-form speech transcription, as a JSON array (`.json`)
    SegLst,
}

impl SegmentFormat {
    /// Determines the format of a file from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("rttm") => Ok(Self::Rttm),
            Some("stm") => Ok(Self::Stm),
            Some("json") => Ok(Self::SegLst),
            _ => Err(anyhow!(
                "unsupported file format for {}: expected a .rttm, .stm or .json file",
                path.display()
            )),
        }
    }

    /// Parses the content of a file in this format.
    pub fn parse(&self, content: &str) -> std::result::Result<Sessions, FormatError> {
        match self {
            Self::Rttm => rttm::parse(content),
            Self::Stm => stm::parse(content),
            Self::SegLst => seglst::parse(content),
        }
    }
}

/// Reads speaker segments from all given files and merges them.
#[instrument(level = "debug", skip_all)]
pub async fn read_sessions<P>(paths: &[P]) -> Result<Sessions>
where
    P: AsRef<Path>,
{
    let mut sessions = Sessions::new();
    for path in paths {
        sessions.merge(read_session_file(path.as_ref()).await?);
    }
    Ok(sessions)
}

#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
async fn read_session_file(path: &Path) -> Result<Sessions> {
    let format = SegmentFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let sessions = format
        .parse(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(?format, sessions = sessions.len(), "Segment file loaded");

    Ok(sessions)
}

/// Iterates over the non-comment lines of a text file, with 1-based line numbers.
///
/// Empty lines and lines starting with `;;` are skipped.
pub(crate) fn data_lines(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(";;"))
        .map(|(line_no, line)| (line_no, line.split_whitespace().collect()))
}

pub(crate) fn require_fields(
    line: usize,
    fields: &[&str],
    expected: usize,
) -> std::result::Result<(), FormatError> {
    match fields.len() >= expected {
        true => Ok(()),
        false => Err(FormatError::MissingFields { line, expected, actual: fields.len() }),
    }
}

pub(crate) fn parse_time(
    line: usize,
    field: &'static str,
    value: &str,
) -> std::result::Result<f64, FormatError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|time| time.is_finite())
        .ok_or_else(|| FormatError::InvalidNumber { line, field, value: value.into() })
}

pub(crate) fn check_range(
    line: usize,
    start: f64,
    end: f64,
) -> std::result::Result<(), FormatError> {
    match end >= start {
        true => Ok(()),
        false => Err(FormatError::NegativeDuration { line, start, end }),
    }
}
