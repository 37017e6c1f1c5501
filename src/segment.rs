//! Speaker segments and their grouping by session.

use std::collections::BTreeMap;

/// One speaker turn: `speaker` talks in `session_id` from `start_time` to `end_time` (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Recording (session) the segment belongs to
    pub session_id: String,

    /// Speaker label
    pub speaker: String,

    /// Begin time, in seconds
    pub start_time: f64,

    /// End time, in seconds
    pub end_time: f64,
}

impl Segment {
    /// Creates a new [`Segment`].
    pub fn new<S, P>(session_id: S, speaker: P, start_time: f64, end_time: f64) -> Self
    where
        S: Into<String>,
        P: Into<String>,
    {
        Self { session_id: session_id.into(), speaker: speaker.into(), start_time, end_time }
    }
}

/// Segments grouped by session id, sorted by session id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sessions(BTreeMap<String, Vec<Segment>>);

impl Sessions {
    /// Creates an empty set of sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment to its session.
    pub fn push(&mut self, segment: Segment) {
        self.0
            .entry(segment.session_id.clone())
            .or_default()
            .push(segment);
    }

    /// Adds all segments of `other`.
    pub fn merge(&mut self, other: Sessions) {
        for (session_id, segments) in other.0 {
            self.0.entry(session_id).or_default().extend(segments);
        }
    }

    /// Keeps only the sessions whose id satisfies `keep`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.0.retain(|session_id, _| keep(session_id));
    }

    /// Segments of the given session, if any.
    pub fn get(&self, session_id: &str) -> Option<&[Segment]> {
        self.0.get(session_id).map(Vec::as_slice)
    }

    /// Whether the given session exists.
    pub fn contains(&self, session_id: &str) -> bool {
        self.0.contains_key(session_id)
    }

    /// Session ids, in sorted order.
    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes the given session and returns its segments.
    pub fn take(&mut self, session_id: &str) -> Vec<Segment> {
        self.0.remove(session_id).unwrap_or_default()
    }
}

impl FromIterator<Segment> for Sessions {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        let mut sessions = Self::new();
        for segment in iter {
            sessions.push(segment);
        }
        sessions
    }
}

#[cfg(test)]
mod tests {
    mod sessions {
        use crate::segment::{Segment, Sessions};

        fn sample() -> Sessions {
            [
                Segment::new("meeting_b", "spk1", 0.0, 1.0),
                Segment::new("meeting_a", "spk1", 0.0, 2.0),
                Segment::new("meeting_a", "spk2", 1.0, 3.0),
                Segment::new("meeting_ab", "spk1", 0.0, 1.0),
            ]
            .into_iter()
            .collect()
        }

        #[test]
        fn test_grouping() {
            let sessions = sample();

            assert_eq!(3, sessions.len());
            assert_eq!(
                vec!["meeting_a", "meeting_ab", "meeting_b"],
                sessions.session_ids().collect::<Vec<_>>()
            );
            assert_eq!(2, sessions.get("meeting_a").unwrap().len());
        }

        #[test]
        fn test_retain() {
            let mut sessions = sample();
            sessions.retain(|session_id| session_id.ends_with('a'));

            assert_eq!(vec!["meeting_a"], sessions.session_ids().collect::<Vec<_>>());
        }

        #[test]
        fn test_merge() {
            let mut sessions = sample();
            sessions.merge([Segment::new("meeting_b", "spk2", 1.0, 2.0)].into_iter().collect());

            assert_eq!(2, sessions.get("meeting_b").unwrap().len());
            assert_eq!(3, sessions.len());
        }

        #[test]
        fn test_take() {
            let mut sessions = sample();

            assert_eq!(1, sessions.take("meeting_b").len());
            assert!(sessions.take("meeting_b").is_empty());
            assert!(!sessions.contains("meeting_b"));
        }
    }
}
