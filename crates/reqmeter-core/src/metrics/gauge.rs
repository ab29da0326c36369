use crate::error::{MeterError, Result};
use crate::metrics::atomic::AtomicF64;
use crate::metrics::desc::{Desc, MetricKind};
use crate::metrics::labels::LabelSet;
use crate::registry::Collector;
use crate::snapshot::{FamilySnapshot, SeriesSnapshot, SeriesValue};

/// Single-valued gauge.
///
/// `dec`/`sub` refuse to take the value below zero: a gauge that tracks
/// started-minus-finished work going negative means an increment/decrement
/// pair was broken somewhere, so the update is rejected and logged.
#[derive(Debug)]
pub struct Gauge {
    desc: Desc,
    value: AtomicF64,
}

impl Gauge {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(name, help, MetricKind::Gauge, &[])?,
            value: AtomicF64::new(0.0),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn inc(&self) {
        self.value.add(1.0);
    }

    pub fn dec(&self) -> Result<()> {
        self.sub(1.0)
    }

    pub fn add(&self, delta: f64) -> Result<()> {
        if !delta.is_finite() {
            return Err(MeterError::NonFiniteValue(self.desc.name.clone()));
        }
        if delta < 0.0 {
            return self.sub(-delta);
        }
        self.value.add(delta);
        Ok(())
    }

    pub fn sub(&self, delta: f64) -> Result<()> {
        if !delta.is_finite() {
            return Err(MeterError::NonFiniteValue(self.desc.name.clone()));
        }
        match self.value.add_floored(-delta, 0.0) {
            Ok(_) => Ok(()),
            Err(would_be) => {
                tracing::error!(
                    gauge = %self.desc.name,
                    would_be,
                    "gauge underflow: unbalanced decrement"
                );
                Err(MeterError::GaugeUnderflow(self.desc.name.clone()))
            }
        }
    }

    /// Overwrite the value. The only way to reset a gauge.
    pub fn set(&self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(MeterError::NonFiniteValue(self.desc.name.clone()));
        }
        self.value.store(v);
        Ok(())
    }

    pub fn get(&self) -> f64 {
        self.value.load()
    }
}

impl Collector for Gauge {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Vec<FamilySnapshot> {
        let series = vec![SeriesSnapshot {
            labels: LabelSet::empty(),
            value: SeriesValue::Gauge(self.get()),
        }];
        vec![FamilySnapshot::new(&self.desc, series)]
    }
}
