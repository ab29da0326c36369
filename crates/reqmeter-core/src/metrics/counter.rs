use dashmap::DashMap;

use crate::error::{MeterError, Result};
use crate::metrics::atomic::AtomicF64;
use crate::metrics::desc::{Desc, MetricKind};
use crate::metrics::labels::LabelSet;
use crate::registry::Collector;
use crate::snapshot::{FamilySnapshot, SeriesSnapshot, SeriesValue};

/// Monotonic counter with one series per label set.
#[derive(Debug)]
pub struct CounterVec {
    desc: Desc,
    series: DashMap<LabelSet, AtomicF64>,
}

impl CounterVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(name, help, MetricKind::Counter, label_names)?,
            series: DashMap::new(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1.0)
    }

    /// Increment by `amount`. Negative or non-finite amounts are rejected
    /// before any series is created.
    pub fn add(&self, labels: &[(&str, &str)], amount: f64) -> Result<()> {
        if !amount.is_finite() {
            return Err(MeterError::NonFiniteValue(self.desc.name.clone()));
        }
        if amount < 0.0 {
            return Err(MeterError::NegativeValue {
                metric: self.desc.name.clone(),
                value: amount,
            });
        }
        let key = LabelSet::resolve(&self.desc, labels)?;

        // Fast path: existing series only needs a shard read lock.
        if let Some(c) = self.series.get(&key) {
            c.add(amount);
            return Ok(());
        }
        self.series
            .entry(key)
            .or_insert_with(AtomicF64::default)
            .add(amount);
        Ok(())
    }

    /// Current value of one series (0 if never observed).
    pub fn value(&self, labels: &[(&str, &str)]) -> Result<f64> {
        let key = LabelSet::resolve(&self.desc, labels)?;
        Ok(self.series.get(&key).map(|c| c.load()).unwrap_or(0.0))
    }

    /// Sum across every series.
    pub fn total(&self) -> f64 {
        self.series.iter().map(|r| r.value().load()).sum()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

impl Collector for CounterVec {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Vec<FamilySnapshot> {
        let series = self
            .series
            .iter()
            .map(|r| SeriesSnapshot {
                labels: r.key().clone(),
                value: SeriesValue::Counter(r.value().load()),
            })
            .collect();
        vec![FamilySnapshot::new(&self.desc, series)]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn requests() -> CounterVec {
        CounterVec::new("requests_total", "Requests", &["method", "status"]).unwrap()
    }

    #[test]
    fn series_created_lazily() {
        let c = requests();
        assert_eq!(c.series_count(), 0);
        c.inc(&[("method", "GET"), ("status", "200")]).unwrap();
        c.inc(&[("method", "GET"), ("status", "200")]).unwrap();
        c.inc(&[("method", "GET"), ("status", "404")]).unwrap();
        assert_eq!(c.series_count(), 2);
        assert_eq!(c.value(&[("method", "GET"), ("status", "200")]).unwrap(), 2.0);
        assert_eq!(c.total(), 3.0);
    }

    #[test]
    fn negative_amount_rejected_without_creating_series() {
        let c = requests();
        let err = c.add(&[("method", "GET"), ("status", "200")], -1.0).unwrap_err();
        assert!(matches!(err, MeterError::NegativeValue { .. }));
        assert!(c.add(&[("method", "GET"), ("status", "200")], f64::NAN).is_err());
        assert_eq!(c.series_count(), 0);
    }

    #[test]
    fn fractional_amounts_accumulate() {
        let c = CounterVec::new("bytes_total", "Bytes", &[]).unwrap();
        c.add(&[], 0.5).unwrap();
        c.add(&[], 1.25).unwrap();
        assert_eq!(c.value(&[]).unwrap(), 1.75);
    }

    #[test]
    fn concurrent_increments_on_same_series() {
        let c = Arc::new(requests());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        c.inc(&[("method", "GET"), ("status", "200")]).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.value(&[("method", "GET"), ("status", "200")]).unwrap(), 4000.0);
    }
}
