//! Point-in-time, immutable views of registered metrics.
//!
//! Each series is internally consistent; different series may be captured at
//! slightly different instants.

use crate::error::MeterError;
use crate::metrics::{Desc, LabelSet, MetricKind};

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` in ascending bound order, without `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

impl HistogramSnapshot {
    /// Bucket counts never decrease and never exceed the total count.
    pub fn is_consistent(&self) -> bool {
        let monotonic = self.buckets.windows(2).all(|w| w[0].1 <= w[1].1);
        let capped = self.buckets.last().map(|(_, c)| *c <= self.count).unwrap_or(true);
        monotonic && capped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramSnapshot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub labels: LabelSet,
    pub value: SeriesValue,
}

/// One metric family. Series that could not be collected are kept as
/// `errors` so the encoder can report them without dropping the family.
#[derive(Debug)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub series: Vec<SeriesSnapshot>,
    pub errors: Vec<MeterError>,
}

impl FamilySnapshot {
    /// Family with its series sorted by label values.
    pub fn new(desc: &Desc, mut series: Vec<SeriesSnapshot>) -> Self {
        series.sort_by(|a, b| a.labels.cmp(&b.labels));
        Self {
            name: desc.name.clone(),
            help: desc.help.clone(),
            kind: desc.kind,
            series,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<MeterError>) -> Self {
        self.errors = errors;
        self
    }

    /// First series whose labels include all of `pairs`.
    pub fn find(&self, pairs: &[(&str, &str)]) -> Option<&SeriesSnapshot> {
        self.series.iter().find(|s| s.labels.matches(pairs))
    }
}

#[derive(Debug, Default)]
pub struct Snapshot {
    pub families: Vec<FamilySnapshot>,
}

impl Snapshot {
    pub fn family(&self, name: &str) -> Option<&FamilySnapshot> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Counter or gauge value of the first matching series.
    pub fn scalar(&self, name: &str, pairs: &[(&str, &str)]) -> Option<f64> {
        match self.family(name)?.find(pairs)?.value {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => Some(v),
            SeriesValue::Histogram(_) => None,
        }
    }
}
