//! Time interval algebra used to build scoring regions.

/// Half-open time range `[start, end)`, in seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    /// Start time (inclusive)
    pub start: f64,

    /// End time (exclusive)
    pub end: f64,
}

impl Interval {
    /// Creates a new [`Interval`].
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the interval; zero for empty intervals.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether the interval covers no time.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A set of sorted, disjoint, non-empty [`Interval`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet(Vec<Interval>);

impl IntervalSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the union of arbitrary intervals. Overlapping and touching intervals are merged;
    /// empty intervals are dropped.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        let mut intervals: Vec<_> = intervals
            .into_iter()
            .filter(|interval| !interval.is_empty())
            .collect();
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match merged.last_mut() {
                Some(last) if interval.start <= last.end => last.end = last.end.max(interval.end),
                _ => merged.push(interval),
            }
        }

        Self(merged)
    }

    /// The intervals of this set, sorted.
    pub fn intervals(&self) -> &[Interval] {
        &self.0
    }

    /// Whether the set covers no time.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total covered time.
    pub fn duration(&self) -> f64 {
        self.0.iter().map(Interval::duration).sum()
    }

    /// Earliest start and latest end, if the set is not empty.
    pub fn span(&self) -> Option<Interval> {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => Some(Interval::new(first.start, last.end)),
            _ => None,
        }
    }

    /// Whether `time` lies inside one of the intervals.
    pub fn contains(&self, time: f64) -> bool {
        let idx = self.0.partition_point(|interval| interval.end <= time);
        self.0
            .get(idx)
            .is_some_and(|interval| interval.start <= time && time < interval.end)
    }

    /// Adds all intervals of `other`.
    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        Self::from_intervals(self.0.iter().chain(other.0.iter()).copied())
    }

    /// Removes the time covered by `other`.
    pub fn subtract(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = Vec::new();
        let mut removed = other.0.iter().peekable();

        for interval in &self.0 {
            let mut start = interval.start;

            while let Some(cut) = removed.peek() {
                if cut.end <= start {
                    removed.next();
                    continue;
                }
                if cut.start >= interval.end {
                    break;
                }
                if cut.start > start {
                    result.push(Interval::new(start, cut.start));
                }
                start = start.max(cut.end);
                if cut.end > interval.end {
                    break;
                }
                removed.next();
            }

            if start < interval.end {
                result.push(Interval::new(start, interval.end));
            }
        }

        Self(result)
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        Self::from_intervals(iter)
    }
}
