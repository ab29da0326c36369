use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{MeterError, Result};
use crate::metrics::desc::{Desc, MetricKind};
use crate::metrics::labels::LabelSet;
use crate::registry::Collector;
use crate::snapshot::{FamilySnapshot, HistogramSnapshot, SeriesSnapshot, SeriesValue};

/// Default latency buckets, in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Bucket bounds must be non-empty, finite and strictly ascending.
/// `+Inf` is implicit and must not be listed.
pub fn validate_buckets(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(MeterError::InvalidBuckets("at least one bucket is required".into()));
    }
    if let Some(b) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(MeterError::InvalidBuckets(format!("bucket bound {b} is not finite")));
    }
    if let Some(w) = bounds.windows(2).find(|w| w[0] >= w[1]) {
        return Err(MeterError::InvalidBuckets(format!(
            "bounds must be strictly ascending ({} then {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// One series' state. Mutated only through a DashMap write guard, so a
/// reader always sees buckets, sum and count from the same observation.
#[derive(Debug, Clone)]
struct HistogramState {
    /// Cumulative: `cumulative[i]` counts observations `<= bounds[i]`.
    cumulative: Vec<u64>,
    sum: f64,
    count: u64,
}

impl HistogramState {
    fn new(buckets: usize) -> Self {
        Self {
            cumulative: vec![0; buckets],
            sum: 0.0,
            count: 0,
        }
    }

    fn record(&mut self, bounds: &[f64], value: f64) {
        // Inclusive upper bounds: a value equal to a bound lands in that bucket.
        for (slot, &bound) in self.cumulative.iter_mut().zip(bounds) {
            if value <= bound {
                *slot += 1;
            }
        }
        self.sum += value;
        self.count += 1;
    }
}

/// Histogram with fixed bucket bounds shared by every series.
#[derive(Debug)]
pub struct HistogramVec {
    desc: Desc,
    bounds: Arc<[f64]>,
    series: DashMap<LabelSet, HistogramState>,
}

impl HistogramVec {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        label_names: &[&str],
        bounds: &[f64],
    ) -> Result<Self> {
        let desc = Desc::new(name, help, MetricKind::Histogram, label_names)?;
        validate_buckets(bounds)?;
        Ok(Self {
            desc,
            bounds: bounds.into(),
            series: DashMap::new(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. `value` must be finite and non-negative.
    pub fn observe(&self, labels: &[(&str, &str)], value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MeterError::NonFiniteValue(self.desc.name.clone()));
        }
        if value < 0.0 {
            return Err(MeterError::NegativeValue {
                metric: self.desc.name.clone(),
                value,
            });
        }
        let key = LabelSet::resolve(&self.desc, labels)?;
        let n = self.bounds.len();
        self.series
            .entry(key)
            .or_insert_with(|| HistogramState::new(n))
            .record(&self.bounds, value);
        Ok(())
    }

    /// Consistent copy of one series, if it exists.
    pub fn snapshot(&self, labels: &[(&str, &str)]) -> Result<Option<HistogramSnapshot>> {
        let key = LabelSet::resolve(&self.desc, labels)?;
        Ok(self.series.get(&key).map(|s| self.to_snapshot(&s)))
    }

    /// Sum of observation counts across every series.
    pub fn total_count(&self) -> u64 {
        self.series.iter().map(|r| r.value().count).sum()
    }

    fn to_snapshot(&self, s: &HistogramState) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self.bounds.iter().copied().zip(s.cumulative.iter().copied()).collect(),
            sum: s.sum,
            count: s.count,
        }
    }
}

impl Collector for HistogramVec {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Vec<FamilySnapshot> {
        let series = self
            .series
            .iter()
            .map(|r| SeriesSnapshot {
                labels: r.key().clone(),
                value: SeriesValue::Histogram(self.to_snapshot(r.value())),
            })
            .collect();
        vec![FamilySnapshot::new(&self.desc, series)]
    }
}
