//! SegLST reader.
//!
//! A SegLST file is a JSON array of segment objects. Only `session_id`, `speaker`, `start_time`
//! and `end_time` are read; times may be numbers or numeric strings. Other keys are ignored.

use serde::Deserialize;

use crate::format::{check_range, parse_time, FormatError};
use crate::segment::{Segment, Sessions};

#[derive(Debug, Deserialize)]
struct RawSegment {
    session_id: String,
    speaker: String,
    start_time: RawTime,
    end_time: RawTime,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTime {
    Number(f64),
    Text(String),
}

impl RawTime {
    fn resolve(&self, entry: usize, field: &'static str) -> Result<f64, FormatError> {
        match self {
            RawTime::Number(time) => Ok(*time),
            RawTime::Text(text) => parse_time(entry, field, text.trim()),
        }
    }
}

/// Parses SegLST content.
///
/// Errors report the 1-based index of the offending array entry as the line.
pub fn parse(content: &str) -> Result<Sessions, FormatError> {
    let raw: Vec<RawSegment> = serde_json::from_str(content)?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let entry = idx + 1;
            let start_time = raw.start_time.resolve(entry, "start_time")?;
            let end_time = raw.end_time.resolve(entry, "end_time")?;
            check_range(entry, start_time, end_time)?;

            Ok(Segment::new(raw.session_id, raw.speaker, start_time, end_time))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse() {
        let content = r#"[
            {"session_id": "rec1", "speaker": "alice", "start_time": 0.5, "end_time": 2, "words": "hi"},
            {"session_id": "rec1", "speaker": "bob", "start_time": "2.5", "end_time": "3.0"}
        ]"#;
        let sessions = parse(content).unwrap();

        assert_eq!(
            Some(
                &[
                    Segment::new("rec1", "alice", 0.5, 2.0),
                    Segment::new("rec1", "bob", 2.5, 3.0),
                ][..]
            ),
            sessions.get("rec1")
        );
    }

    #[test]
    fn test_missing_key() {
        assert_matches!(
            parse(r#"[{"session_id": "rec1", "start_time": 0, "end_time": 1}]"#),
            Err(FormatError::Json(_))
        );
    }

    #[test]
    fn test_invalid_time_string() {
        assert_matches!(
            parse(r#"[{"session_id": "r", "speaker": "s", "start_time": "x", "end_time": 1}]"#),
            Err(FormatError::InvalidNumber { line: 1, field: "start_time", .. })
        );
    }
}
