#![forbid(unsafe_code)]

//! Raw sample series and bucket reduction.
//!
//! A [`SampleSeries`] is an append-only, time-ordered list of `f64` samples.
//! [`SampleSeries::reduce`] collapses it into at most `k` display buckets,
//! one per graph column, using the series' [`AggregateKind`].
//!
//! # Partitioning
//!
//! For `n` samples and `k < n` buckets the samples are split into `k`
//! contiguous spans. The first `n % k` spans hold `ceil(n / k)` samples and
//! the rest hold `floor(n / k)`, so every span is non-empty and span sizes
//! differ by at most one. With `k >= n` each sample is its own bucket.
//!
//! ```
//! use ctop_widgets::series::{AggregateKind, SampleSeries};
//!
//! let series = SampleSeries::from_values(AggregateKind::Average, [10.0, 20.0, 30.0, 40.0]);
//! assert_eq!(series.reduce(2), vec![15.0, 35.0]);
//! ```

use std::ops::Range;

/// How several raw samples collapse into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AggregateKind {
    /// Largest sample of the span.
    #[default]
    Max,
    /// Smallest sample of the span.
    Min,
    /// Arithmetic mean of the span.
    Average,
}

impl AggregateKind {
    /// Parse `max`, `min`, `avg` / `average` (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "avg" | "average" | "mean" => Some(Self::Average),
            _ => None,
        }
    }

    /// Reduce a non-empty span. Returns `None` for an empty span.
    #[must_use]
    pub fn apply(self, span: &[f64]) -> Option<f64> {
        if span.is_empty() {
            return None;
        }
        let value = match self {
            Self::Max => span.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => span.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Average => span.iter().sum::<f64>() / span.len() as f64,
        };
        Some(value)
    }
}

/// Append-only sequence of raw samples with an attached aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    kind: AggregateKind,
    samples: Vec<f64>,
}

impl SampleSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new(kind: AggregateKind) -> Self {
        Self {
            kind,
            samples: Vec::new(),
        }
    }

    /// Create a series pre-filled with `values` in order.
    #[must_use]
    pub fn from_values(kind: AggregateKind, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            kind,
            samples: values.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn aggregate_kind(&self) -> AggregateKind {
        self.kind
    }

    /// Append one sample. Growth is unbounded.
    pub fn append(&mut self, value: f64) {
        self.samples.push(value);
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw samples in insertion order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.samples
    }

    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// Largest raw sample, independent of any reduction.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        AggregateKind::Max.apply(&self.samples)
    }

    /// Smallest raw sample.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        AggregateKind::Min.apply(&self.samples)
    }

    /// Reduce the raw samples into at most `buckets` values.
    ///
    /// Empty series or `buckets == 0` yield an empty vector.
    #[must_use]
    pub fn reduce(&self, buckets: usize) -> Vec<f64> {
        span_ranges(self.samples.len(), buckets)
            .filter_map(|range| self.kind.apply(&self.samples[range]))
            .collect()
    }
}

/// Contiguous spans covering `0..len` for `buckets` output columns.
///
/// Yields `min(len, buckets)` non-empty ranges in order.
pub fn span_ranges(len: usize, buckets: usize) -> impl Iterator<Item = Range<usize>> {
    let count = len.min(buckets);
    let (base, extra) = if count == 0 {
        (0, 0)
    } else {
        (len / count, len % count)
    };
    let mut start = 0;
    (0..count).map(move |idx| {
        let size = if idx < extra { base + 1 } else { base };
        let range = start..start + size;
        start += size;
        range
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(kind: AggregateKind, values: &[f64]) -> SampleSeries {
        SampleSeries::from_values(kind, values.iter().copied())
    }

    #[test]
    fn average_of_four_into_two() {
        let s = series(AggregateKind::Average, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(s.reduce(2), vec![15.0, 35.0]);
    }

    #[test]
    fn max_of_four_into_two() {
        let s = series(AggregateKind::Max, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(s.reduce(2), vec![20.0, 40.0]);
    }

    #[test]
    fn min_of_four_into_two() {
        let s = series(AggregateKind::Min, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(s.reduce(2), vec![10.0, 30.0]);
    }

    #[test]
    fn empty_series_reduces_to_nothing() {
        let s = SampleSeries::new(AggregateKind::Average);
        assert!(s.reduce(0).is_empty());
        assert!(s.reduce(1).is_empty());
        assert!(s.reduce(80).is_empty());
        assert_eq!(s.max(), None);
    }

    #[test]
    fn zero_buckets_is_empty() {
        let s = series(AggregateKind::Max, &[1.0, 2.0]);
        assert!(s.reduce(0).is_empty());
    }

    #[test]
    fn more_buckets_than_samples_is_identity() {
        let s = series(AggregateKind::Average, &[3.0, 1.0, 2.0]);
        assert_eq!(s.reduce(3), vec![3.0, 1.0, 2.0]);
        assert_eq!(s.reduce(50), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn uneven_split_front_loads_larger_spans() {
        let spans: Vec<_> = span_ranges(10, 4).collect();
        assert_eq!(spans, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn no_empty_span_when_ceil_would_overrun() {
        // ceil(10/6) = 2 would only fill five spans; the sixth must not be empty.
        let spans: Vec<_> = span_ranges(10, 6).collect();
        assert_eq!(spans.len(), 6);
        assert!(spans.iter().all(|r| !r.is_empty()));
        assert_eq!(spans.last().map(|r| r.end), Some(10));
    }

    #[test]
    fn max_is_over_whole_series() {
        let s = series(AggregateKind::Min, &[4.0, 9.0, 2.0]);
        assert_eq!(s.max(), Some(9.0));
        assert_eq!(s.min(), Some(2.0));
        assert_eq!(s.last(), Some(2.0));
    }

    #[test]
    fn append_preserves_order_and_clear_resets() {
        let mut s = SampleSeries::new(AggregateKind::Max);
        s.append(1.0);
        s.append(5.0);
        s.append(3.0);
        assert_eq!(s.values(), &[1.0, 5.0, 3.0]);
        assert_eq!(s.len(), 3);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn parse_aggregate_names() {
        assert_eq!(AggregateKind::parse("MAX"), Some(AggregateKind::Max));
        assert_eq!(AggregateKind::parse(" min "), Some(AggregateKind::Min));
        assert_eq!(AggregateKind::parse("avg"), Some(AggregateKind::Average));
        assert_eq!(AggregateKind::parse("average"), Some(AggregateKind::Average));
        assert_eq!(AggregateKind::parse("median"), None);
    }
}
