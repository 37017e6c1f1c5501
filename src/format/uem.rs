//! UEM (Un-partitioned Evaluation Map) reader.
//!
//! ```text
//! <session> <channel> <begin> <end>
//! ```
//!
//! A session may have several lines; its scoring region is their union.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tokio::fs;
use tracing::{debug, instrument};

use crate::der::interval::{Interval, IntervalSet};
use crate::format::{check_range, data_lines, parse_time, require_fields, FormatError};
use crate::Result;

const MIN_FIELDS: usize = 4;

/// Scoring regions per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uem(BTreeMap<String, IntervalSet>);

impl Uem {
    /// Scoring region of the given session, if it has one.
    pub fn get(&self, session_id: &str) -> Option<&IntervalSet> {
        self.0.get(session_id)
    }

    /// Number of sessions with a scoring region.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no session has a scoring region.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge(&mut self, other: Uem) {
        for (session_id, region) in other.0 {
            let merged = match self.0.remove(&session_id) {
                Some(existing) => existing.union(&region),
                None => region,
            };
            self.0.insert(session_id, merged);
        }
    }
}

/// Parses UEM content.
pub fn parse(content: &str) -> std::result::Result<Uem, FormatError> {
    let mut regions: BTreeMap<String, Vec<Interval>> = BTreeMap::new();

    for (line, fields) in data_lines(content) {
        require_fields(line, &fields, MIN_FIELDS)?;

        let start = parse_time(line, "begin", fields[2])?;
        let end = parse_time(line, "end", fields[3])?;
        check_range(line, start, end)?;

        regions
            .entry(fields[0].to_string())
            .or_default()
            .push(Interval::new(start, end));
    }

    Ok(Uem(regions
        .into_iter()
        .map(|(session_id, intervals)| (session_id, IntervalSet::from_intervals(intervals)))
        .collect()))
}

/// Reads and merges all given UEM files.
#[instrument(level = "debug", skip_all)]
pub async fn read_uem<P>(paths: &[P]) -> Result<Uem>
where
    P: AsRef<Path>,
{
    let mut uem = Uem::default();
    for path in paths {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read UEM file {}", path.display()))?;
        let parsed = parse(&content)
            .with_context(|| format!("failed to parse UEM file {}", path.display()))?;
        debug!(path = %path.display(), sessions = parsed.len(), "UEM file loaded");

        uem.merge(parsed);
    }
    Ok(uem)
}
