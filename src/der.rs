//! Diarization error rate scoring, following the semantics of NIST's `md-eval-22`.
//!
//! A session is scored in four steps:
//!
//! 1. The scoring region is determined: the session's UEM if one is given, otherwise the span
//!    of the reference segments.
//! 2. No-score zones are removed from it: a collar around every reference segment boundary
//!    and, when scoring [`Regions::NoOverlap`], every region where several reference speakers
//!    talk at the same time.
//! 3. Reference and hypothesis speakers are mapped one-to-one so that their co-active time is
//!    maximal (see [`mapping::optimal_mapping`]).
//! 4. Missed, false alarm and speaker error times are accumulated over the scoring region.

pub mod interval;
pub mod mapping;

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::der::interval::{Interval, IntervalSet};
use crate::der::mapping::optimal_mapping;
use crate::segment::Segment;

/// Which parts of the scoring region are evaluated.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum Regions {
    /// Score the whole region
    #[default]
    All,

    /// Only score where at most one reference speaker is active
    #[value(name = "nooverlap")]
    NoOverlap,
}

/// Options controlling how sessions are scored.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScoringOptions {
    /// No-score zone around every reference segment boundary, in seconds
    pub collar: f64,

    /// Which regions to score
    pub regions: Regions,
}

/// Diarization error rate and the times it is computed from, in seconds.
///
/// Times are speaker-weighted (`*_speaker_time`: two overlapping speakers count twice) or
/// speech-weighted (`*_speech_time`: counted once regardless of the number of speakers).
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiaErrorRate {
    /// `(missed + falarm + speaker error) / scored`, or `None` if nothing was scored
    pub error_rate: Option<f64>,

    /// Total reference speaker time in the scoring region
    pub scored_speaker_time: f64,

    /// Reference speaker time with no hypothesis speaker to account for it
    pub missed_speaker_time: f64,

    /// Hypothesis speaker time with no reference speaker to account for it
    pub falarm_speaker_time: f64,

    /// Time attributed to the wrong hypothesis speaker
    pub speaker_error_time: f64,

    /// Reference speech time in the scoring region
    pub scored_speech_time: f64,

    /// Reference speech time where the hypothesis has no speech
    pub missed_speech_time: f64,

    /// Hypothesis speech time where the reference has no speech
    pub falarm_speech_time: f64,
}

impl DiaErrorRate {
    /// Sum of missed, false alarm and speaker error times.
    pub fn error_time(&self) -> f64 {
        self.missed_speaker_time + self.falarm_speaker_time + self.speaker_error_time
    }

    fn with_error_rate(mut self) -> Self {
        self.error_rate = (self.scored_speaker_time > 0.0)
            .then(|| self.error_time() / self.scored_speaker_time);
        self
    }
}

impl Add for DiaErrorRate {
    type Output = DiaErrorRate;

    fn add(self, rhs: Self) -> Self::Output {
        DiaErrorRate {
            error_rate: None,
            scored_speaker_time: self.scored_speaker_time + rhs.scored_speaker_time,
            missed_speaker_time: self.missed_speaker_time + rhs.missed_speaker_time,
            falarm_speaker_time: self.falarm_speaker_time + rhs.falarm_speaker_time,
            speaker_error_time: self.speaker_error_time + rhs.speaker_error_time,
            scored_speech_time: self.scored_speech_time + rhs.scored_speech_time,
            missed_speech_time: self.missed_speech_time + rhs.missed_speech_time,
            falarm_speech_time: self.falarm_speech_time + rhs.falarm_speech_time,
        }
        .with_error_rate()
    }
}

impl Sum for DiaErrorRate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DiaErrorRate::default(), |total, der| total + der)
    }
}

impl<'a> Sum<&'a DiaErrorRate> for DiaErrorRate {
    fn sum<I: Iterator<Item = &'a DiaErrorRate>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Scoring result for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Session that was scored
    #[serde(skip)]
    pub session_id: String,

    /// Error rate of the session
    #[serde(flatten)]
    pub error_rate: DiaErrorRate,

    /// Reference speaker to hypothesis speaker mapping used for scoring
    pub speaker_mapping: BTreeMap<String, String>,
}

/// Scores the hypothesis segments of one session against the reference segments.
///
/// `uem`, when given, replaces the default scoring region (the span of the reference).
pub fn score_session(
    session_id: &str,
    reference: &[Segment],
    hypothesis: &[Segment],
    uem: Option<&IntervalSet>,
    options: &ScoringOptions,
) -> SessionResult {
    let reference = SpeakerTimeline::new(reference);
    let hypothesis = SpeakerTimeline::new(hypothesis);
    let scored = scoring_region(&reference, uem, options);

    let mut boundaries: Vec<f64> = reference
        .boundaries()
        .chain(hypothesis.boundaries())
        .chain(scored.intervals().iter().flat_map(|i| [i.start, i.end]))
        .collect();
    boundaries.sort_by(f64::total_cmp);
    boundaries.dedup();

    let mut times = DiaErrorRate::default();
    let mut overlap = vec![vec![0.0; hypothesis.len()]; reference.len()];
    let mut pieces = Vec::new();

    for window in boundaries.windows(2) {
        let piece = Interval::new(window[0], window[1]);
        let midpoint = (piece.start + piece.end) / 2.0;
        if piece.is_empty() || !scored.contains(midpoint) {
            continue;
        }

        let duration = piece.duration();
        let active_ref = reference.active_at(midpoint);
        let active_hyp = hypothesis.active_at(midpoint);
        let (n_ref, n_hyp) = (active_ref.len() as f64, active_hyp.len() as f64);

        times.scored_speaker_time += duration * n_ref;
        times.missed_speaker_time += duration * (n_ref - n_hyp).max(0.0);
        times.falarm_speaker_time += duration * (n_hyp - n_ref).max(0.0);
        match (active_ref.is_empty(), active_hyp.is_empty()) {
            (false, true) => {
                times.scored_speech_time += duration;
                times.missed_speech_time += duration;
            },
            (false, false) => times.scored_speech_time += duration,
            (true, false) => times.falarm_speech_time += duration,
            (true, true) => (),
        }

        for &r in &active_ref {
            for &h in &active_hyp {
                overlap[r][h] += duration;
            }
        }
        pieces.push((duration, active_ref, active_hyp));
    }

    let pairs = optimal_mapping(&overlap);
    let mut mapped_hyp = vec![None; reference.len()];
    for &(r, h) in &pairs {
        mapped_hyp[r] = Some(h);
    }

    for (duration, active_ref, active_hyp) in &pieces {
        let correct = active_ref
            .iter()
            .filter(|&&r| mapped_hyp[r].is_some_and(|h| active_hyp.contains(&h)))
            .count();
        let matched = active_ref.len().min(active_hyp.len());
        times.speaker_error_time += duration * (matched - correct) as f64;
    }

    let speaker_mapping = pairs
        .into_iter()
        .map(|(r, h)| (reference.speaker(r).to_string(), hypothesis.speaker(h).to_string()))
        .collect();

    SessionResult {
        session_id: session_id.to_string(),
        error_rate: times.with_error_rate(),
        speaker_mapping,
    }
}

fn scoring_region(
    reference: &SpeakerTimeline,
    uem: Option<&IntervalSet>,
    options: &ScoringOptions,
) -> IntervalSet {
    let region = match uem {
        Some(uem) => uem.clone(),
        None => reference
            .span()
            .map(|span| IntervalSet::from_intervals([span]))
            .unwrap_or_default(),
    };

    let mut no_score = IntervalSet::new();
    if options.collar > 0.0 {
        no_score = no_score.union(&reference.collars(options.collar));
    }
    if options.regions == Regions::NoOverlap {
        no_score = no_score.union(&reference.overlap_regions());
    }

    region.subtract(&no_score)
}

/// Merged activity of each speaker of one session.
#[derive(Debug)]
struct SpeakerTimeline<'a> {
    speakers: Vec<&'a str>,
    activity: Vec<IntervalSet>,
}

impl<'a> SpeakerTimeline<'a> {
    fn new(segments: &'a [Segment]) -> Self {
        let mut by_speaker: BTreeMap<&str, Vec<Interval>> = BTreeMap::new();
        for segment in segments {
            by_speaker
                .entry(segment.speaker.as_str())
                .or_default()
                .push(Interval::new(segment.start_time, segment.end_time));
        }

        let (speakers, activity): (Vec<_>, Vec<_>) = by_speaker
            .into_iter()
            .map(|(speaker, intervals)| (speaker, IntervalSet::from_intervals(intervals)))
            .filter(|(_, activity)| !activity.is_empty())
            .unzip();

        Self { speakers, activity }
    }

    fn len(&self) -> usize {
        self.speakers.len()
    }

    fn speaker(&self, idx: usize) -> &'a str {
        self.speakers[idx]
    }

    fn boundaries(&self) -> impl Iterator<Item = f64> + '_ {
        self.activity
            .iter()
            .flat_map(|set| set.intervals().iter().flat_map(|i| [i.start, i.end]))
    }

    fn span(&self) -> Option<Interval> {
        self.activity
            .iter()
            .filter_map(IntervalSet::span)
            .reduce(|a, b| Interval::new(a.start.min(b.start), a.end.max(b.end)))
    }

    fn active_at(&self, time: f64) -> Vec<usize> {
        self.activity
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(time))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn collars(&self, collar: f64) -> IntervalSet {
        self.boundaries()
            .map(|time| Interval::new(time - collar, time + collar))
            .collect()
    }

    fn overlap_regions(&self) -> IntervalSet {
        let mut boundaries: Vec<f64> = self.boundaries().collect();
        boundaries.sort_by(f64::total_cmp);
        boundaries.dedup();

        boundaries
            .windows(2)
            .map(|window| Interval::new(window[0], window[1]))
            .filter(|piece| self.active_at((piece.start + piece.end) / 2.0).len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(speaker: &str, start: f64, end: f64) -> Segment {
        Segment::new("rec", speaker, start, end)
    }

    fn score(reference: &[Segment], hypothesis: &[Segment], options: ScoringOptions) -> SessionResult {
        score_session("rec", reference, hypothesis, None, &options)
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!((expected - actual).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    mod score_session {
        use super::*;

        #[test]
        fn test_perfect_hypothesis() {
            let reference = [seg("a", 0.0, 2.0), seg("b", 2.0, 5.0)];
            let result = score(&reference, &reference, ScoringOptions::default());

            assert_eq!(Some(0.0), result.error_rate.error_rate);
            assert_close(5.0, result.error_rate.scored_speaker_time);
            assert_close(5.0, result.error_rate.scored_speech_time);
        }

        #[test]
        fn test_empty_hypothesis_is_all_missed() {
            let reference = [seg("a", 0.0, 2.0), seg("b", 1.0, 3.0)];
            let result = score(&reference, &[], ScoringOptions::default());

            assert_eq!(Some(1.0), result.error_rate.error_rate);
            assert_close(4.0, result.error_rate.missed_speaker_time);
            assert_close(3.0, result.error_rate.missed_speech_time);
            assert!(result.speaker_mapping.is_empty());
        }

        #[test]
        fn test_relabelled_hypothesis() {
            let reference = [seg("a", 0.0, 2.0), seg("b", 2.0, 5.0)];
            let hypothesis = [seg("spk1", 0.0, 2.0), seg("spk0", 2.0, 5.0)];
            let result = score(&reference, &hypothesis, ScoringOptions::default());

            assert_eq!(Some(0.0), result.error_rate.error_rate);
            assert_eq!(Some(&"spk1".to_string()), result.speaker_mapping.get("a"));
            assert_eq!(Some(&"spk0".to_string()), result.speaker_mapping.get("b"));
        }

        #[test]
        fn test_speaker_confusion() {
            let reference = [seg("a", 0.0, 4.0), seg("b", 4.0, 6.0)];
            let hypothesis = [seg("x", 0.0, 6.0)];
            let result = score(&reference, &hypothesis, ScoringOptions::default());
            let der = result.error_rate;

            assert_close(6.0, der.scored_speaker_time);
            assert_close(0.0, der.missed_speaker_time);
            assert_close(0.0, der.falarm_speaker_time);
            assert_close(2.0, der.speaker_error_time);
            assert_close(2.0 / 6.0, der.error_rate.unwrap());
        }

        #[test]
        fn test_false_alarm_inside_region_only() {
            let reference = [seg("a", 1.0, 3.0)];
            let hypothesis = [seg("a", 0.0, 3.0), seg("b", 2.0, 10.0)];
            let der = score(&reference, &hypothesis, ScoringOptions::default()).error_rate;

            // Outside the reference span [1, 3) nothing is scored.
            assert_close(2.0, der.scored_speaker_time);
            assert_close(1.0, der.falarm_speaker_time);
            assert_close(0.0, der.falarm_speech_time);
        }

        #[test]
        fn test_overlapping_reference() {
            let reference = [seg("a", 0.0, 4.0), seg("b", 2.0, 4.0)];
            let hypothesis = [seg("x", 0.0, 4.0)];
            let der = score(&reference, &hypothesis, ScoringOptions::default()).error_rate;

            assert_close(6.0, der.scored_speaker_time);
            assert_close(2.0, der.missed_speaker_time);
            assert_close(0.0, der.missed_speech_time);
            assert_close(4.0, der.scored_speech_time);
        }

        #[test]
        fn test_collar() {
            let reference = [seg("a", 0.0, 4.0)];
            let hypothesis = [seg("a", 0.5, 3.5)];
            let options = ScoringOptions { collar: 0.5, ..Default::default() };
            let der = score(&reference, &hypothesis, options).error_rate;

            assert_close(3.0, der.scored_speaker_time);
            assert_eq!(Some(0.0), der.error_rate);
        }

        #[test]
        fn test_no_overlap_regions() {
            let reference = [seg("a", 0.0, 4.0), seg("b", 2.0, 6.0)];
            let hypothesis = [seg("a", 0.0, 6.0)];
            let options = ScoringOptions { regions: Regions::NoOverlap, ..Default::default() };
            let der = score(&reference, &hypothesis, options).error_rate;

            assert_close(4.0, der.scored_speaker_time);
            assert_close(2.0, der.speaker_error_time);
        }

        #[test]
        fn test_uem_limits_region() {
            let reference = [seg("a", 0.0, 10.0)];
            let hypothesis = [seg("a", 0.0, 2.0)];
            let uem = IntervalSet::from_intervals([Interval::new(0.0, 4.0)]);
            let der = score_session("rec", &reference, &hypothesis, Some(&uem), &Default::default())
                .error_rate;

            assert_close(4.0, der.scored_speaker_time);
            assert_close(2.0, der.missed_speaker_time);
        }

        #[test]
        fn test_nothing_to_score() {
            let result = score(&[], &[seg("x", 0.0, 1.0)], ScoringOptions::default());

            assert_eq!(None, result.error_rate.error_rate);
            assert_eq!(0.0, result.error_rate.falarm_speaker_time);
        }

        #[test]
        fn test_zero_length_reference_segment_is_ignored() {
            let reference = [seg("a", 1.0, 3.0), seg("b", 0.0, 0.0), seg("a", 5.0, 5.0)];
            let result = score(&reference, &[seg("x", 1.0, 3.0)], ScoringOptions::default());
            let der = result.error_rate;

            // The span stays [1, 3): neither 0.0 nor 5.0 widens it.
            assert_close(2.0, der.scored_speaker_time);
            assert_close(2.0, der.scored_speech_time);
            assert_eq!(Some(0.0), der.error_rate);
            assert_eq!(1, result.speaker_mapping.len());
            assert!(!result.speaker_mapping.contains_key("b"));
        }

        #[test]
        fn test_same_speaker_segments_are_merged() {
            let reference = [seg("a", 0.0, 2.0), seg("a", 1.0, 3.0)];
            let der = score(&reference, &[seg("a", 0.0, 3.0)], ScoringOptions::default())
                .error_rate;

            assert_close(3.0, der.scored_speaker_time);
            assert_eq!(Some(0.0), der.error_rate);
        }
    }

    mod dia_error_rate {
        use super::*;

        #[test]
        fn test_sum_recomputes_rate() {
            let first = DiaErrorRate {
                scored_speaker_time: 10.0,
                missed_speaker_time: 1.0,
                ..Default::default()
            }
            .with_error_rate();
            let second = DiaErrorRate {
                scored_speaker_time: 30.0,
                speaker_error_time: 3.0,
                ..Default::default()
            }
            .with_error_rate();

            let total: DiaErrorRate = [first, second].iter().sum();

            assert_close(40.0, total.scored_speaker_time);
            assert_close(0.1, total.error_rate.unwrap());
        }

        #[test]
        fn test_empty_sum() {
            let total: DiaErrorRate = std::iter::empty::<DiaErrorRate>().sum();

            assert_eq!(None, total.error_rate);
        }

        #[test]
        fn test_serialized_keys() {
            let json = serde_json::to_value(DiaErrorRate::default()).unwrap();

            assert!(json["error_rate"].is_null());
            assert_eq!(0.0, json["speaker_error_time"].as_f64().unwrap());
        }
    }
}
