//! NIST RTTM (Rich Transcription Time Marked) reader.
//!
//! Only `SPEAKER` records are used:
//!
//! ```text
//! SPEAKER <session> <channel> <begin> <duration> <NA> <NA> <speaker> <NA> [<NA>]
//! ```

use crate::format::{data_lines, parse_time, require_fields, FormatError};
use crate::segment::{Segment, Sessions};

const SPEAKER_RECORD: &str = "SPEAKER";
const MIN_FIELDS: usize = 8;

/// Parses RTTM content. Records other than `SPEAKER` are skipped.
pub fn parse(content: &str) -> Result<Sessions, FormatError> {
    let mut sessions = Sessions::new();

    for (line, fields) in data_lines(content) {
        if fields[0] != SPEAKER_RECORD {
            continue;
        }
        require_fields(line, &fields, MIN_FIELDS)?;

        let start_time = parse_time(line, "begin", fields[3])?;
        let duration = parse_time(line, "duration", fields[4])?;
        if duration < 0.0 {
            return Err(FormatError::NegativeDuration {
                line,
                start: start_time,
                end: start_time + duration,
            });
        }

        sessions.push(Segment::new(fields[1], fields[7], start_time, start_time + duration));
    }

    Ok(sessions)
}
