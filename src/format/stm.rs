//! NIST STM (Segment Time Mark) reader.
//!
//! ```text
//! <session> <channel> <speaker> <begin> <end> [<transcript>...]
//! ```
//!
//! The transcript is ignored.

use crate::format::{check_range, data_lines, parse_time, require_fields, FormatError};
use crate::segment::{Segment, Sessions};

const MIN_FIELDS: usize = 5;

/// Parses STM content.
pub fn parse(content: &str) -> Result<Sessions, FormatError> {
    let mut sessions = Sessions::new();

    for (line, fields) in data_lines(content) {
        require_fields(line, &fields, MIN_FIELDS)?;

        let start_time = parse_time(line, "begin", fields[3])?;
        let end_time = parse_time(line, "end", fields[4])?;
        check_range(line, start_time, end_time)?;

        sessions.push(Segment::new(fields[0], fields[2], start_time, end_time));
    }

    Ok(sessions)
}
